//! System prompts keyed by diagram type and output format.
//!
//! [`prompt_for`] is total: every type/format pair yields a prompt, with
//! untabulated types falling back to a generic expert prompt for the format.

use crate::types::{DiagramFormat, DiagramType};

const MERMAID_FLOWCHART: &str = "\
You are an expert in process flow design. The user describes a process; produce Mermaid flowchart code for it.
Requirements:
- Use clear, short node labels
- Use distinct shapes where they carry meaning (rectangles, decisions, rounded terminals)
- Make every edge direction explicit
- The code must be valid and renderable
Use concise, unambiguous node and edge syntax. Return only the Mermaid code, with no explanation.";

const MERMAID_ARCHITECTURE: &str = "\
You are a system architect. The user describes a system; produce Mermaid flowchart code showing its architecture.
Requirements:
- Group layers (frontend, backend, data, ...) with subgraph blocks
- Name the technologies and components explicitly
- Show data flow and dependencies as edges
Use concise, unambiguous node and edge syntax. Return only the Mermaid code, with no explanation.";

const MERMAID_SEQUENCE: &str = "\
You are a UML sequence diagram expert. The user describes an interaction; produce Mermaid sequenceDiagram code.
Requirements:
- Declare every participant (actor, system, service)
- Order messages chronologically
- Label important return values
Use concise, unambiguous message syntax. Return only the Mermaid code, with no explanation.";

const MERMAID_ER: &str = "\
You are a database design expert. The user describes a data model; produce Mermaid erDiagram code.
Requirements:
- Define entities and their attributes
- Mark primary keys (PK) and foreign keys (FK)
- Use the correct relationship cardinality (one-to-one, one-to-many, many-to-many)
Use concise, unambiguous entity and relationship syntax. Return only the Mermaid code, with no explanation.";

const MERMAID_GANTT: &str = "\
You are a project management expert. The user describes project work; produce Mermaid gantt code.
Requirements:
- Split the work into tasks with sensible durations
- Express task dependencies
- Group tasks with section blocks
Use concise, unambiguous task syntax. Return only the Mermaid code, with no explanation.";

const MERMAID_CLASS: &str = "\
You are a software architect. The user describes a class structure; produce Mermaid classDiagram code.
Requirements:
- Define attributes and methods for each class
- Mark visibility (+public, -private, #protected)
- Express inheritance, realization, composition and aggregation explicitly
Use concise, unambiguous class syntax. Return only the Mermaid code, with no explanation.";

const MERMAID_STATE: &str = "\
You are a state machine design expert. The user describes state transitions; produce Mermaid stateDiagram-v2 code.
Requirements:
- Define every state
- Label transition conditions
- Mark the start and end states
- Use composite states where they help
Use concise, unambiguous transition syntax. Return only the Mermaid code, with no explanation.";

const MERMAID_FALLBACK: &str = "\
You are a Mermaid diagram expert. Produce Mermaid code matching the user's description, \
using concise, unambiguous node and edge syntax. Return only the code, with no explanation.";

const DRAWIO_BASE: &str = r#"You are an expert diagram designer. The user describes a diagram in natural language; produce it as a Draw.io XML document.

Draw.io XML requirements:
- Use the standard mxfile structure
- Every shape is an mxCell with a unique id
- Use mxGeometry for position and size (x, y, width, height)
- Use the style attribute for colors, shapes and borders
- Edges are mxCell elements with edge="1" whose source and target attributes name node ids

Minimal document:
<?xml version="1.0" encoding="UTF-8"?>
<mxfile host="embed.diagrams.net" agent="diagen" version="21.0.0">
  <diagram name="Diagram" id="diagram-1">
    <mxGraphModel dx="800" dy="600" grid="1" gridSize="10" guides="1" tooltips="1" connect="1" arrows="1" fold="1" page="1" pageScale="1" pageWidth="827" pageHeight="1169">
      <root>
        <mxCell id="0" />
        <mxCell id="1" parent="0" />
        <!-- diagram cells start at id="2" -->
      </root>
    </mxGraphModel>
  </diagram>
</mxfile>

Rules:
1. Element ids are unique and assigned in increasing order starting at 2
2. Layout: 80-120 units of vertical spacing and 150-200 units of horizontal spacing between nodes
3. Use harmonious fillColor and strokeColor pairs
4. Default node size is width=120, height=60
5. Use edgeStyle=orthogonalEdgeStyle so edges stay orthogonal

"#;

const DRAWIO_FLOWCHART: &str = r#"Flowchart conventions:
- Start/end: ellipse, fillColor=#d5e8d4, strokeColor=#82b366
- Process step: rectangle (rounded=0), fillColor=#dae8fc, strokeColor=#6c8ebf
- Decision: rhombus, fillColor=#fff2cc, strokeColor=#d6b656
- Edges: endArrow=classic to show direction; label branches through the value attribute

Node example:
<mxCell id="2" value="Start" style="ellipse;whiteSpace=wrap;html=1;fillColor=#d5e8d4;strokeColor=#82b366;" vertex="1" parent="1">
  <mxGeometry x="300" y="50" width="120" height="60" as="geometry" />
</mxCell>

Edge example:
<mxCell id="4" value="" style="edgeStyle=orthogonalEdgeStyle;rounded=0;orthogonalLoop=1;jettySize=auto;html=1;strokeWidth=2;endArrow=classic;" edge="1" parent="1" source="2" target="3">
  <mxGeometry relative="1" as="geometry" />
</mxCell>
"#;

const DRAWIO_ARCHITECTURE: &str = r#"Architecture conventions:
- Database: shape=cylinder3, fillColor=#f8cecc, strokeColor=#b85450
- Service/component: rounded=1 rectangle, fillColor=#dae8fc, strokeColor=#6c8ebf
- External system: shape=hexagon, fillColor=#e1d5e7, strokeColor=#9673a6
- Layered layout: user interface on top, services in the middle, data at the bottom
- Arrows show data flow and dependencies

Database example:
<mxCell id="10" value="PostgreSQL" style="shape=cylinder3;whiteSpace=wrap;html=1;fillColor=#f8cecc;strokeColor=#b85450;boundedLbl=1;backgroundOutline=1;size=15;" vertex="1" parent="1">
  <mxGeometry x="300" y="400" width="120" height="80" as="geometry" />
</mxCell>
"#;

const DRAWIO_SEQUENCE: &str = "\
Sequence conventions:
- Participants: shape=umlActor or rectangles, fillColor=#dae8fc
- Lifelines: vertical dashed lines
- Messages: arrows whose value attribute holds the message text
- Time flows top to bottom
- 200 units between participants, 80 units between messages
";

const DRAWIO_ER: &str = r#"Entity-relationship conventions:
- Entity: rectangle, fillColor=#dae8fc, strokeColor=#6c8ebf
- List attributes inside the entity separated by <br>
- Relationships: rhombus shapes or direct edges
- Label cardinality (1:1, 1:N, N:M)

Entity example:
<mxCell id="20" value="User<br>---<br>id (PK)<br>name<br>email" style="rounded=0;whiteSpace=wrap;html=1;fillColor=#dae8fc;strokeColor=#6c8ebf;align=left;verticalAlign=top;" vertex="1" parent="1">
  <mxGeometry x="200" y="100" width="120" height="100" as="geometry" />
</mxCell>
"#;

const DRAWIO_FALLBACK: &str = "Produce Draw.io XML that best fits the user's description.\n";

const DRAWIO_CLOSING: &str = "
Reply with only the complete XML document. Do not wrap it in markdown code fences and do not add any explanation. Start directly with <?xml.";

/// System prompt for generating a diagram of `diagram_type` in `format`.
#[must_use]
pub fn prompt_for(diagram_type: DiagramType, format: DiagramFormat) -> String {
    match format {
        DiagramFormat::Mermaid => mermaid_prompt(diagram_type).to_owned(),
        DiagramFormat::Drawio => {
            let body = drawio_prompt(diagram_type);
            let mut prompt =
                String::with_capacity(DRAWIO_BASE.len() + body.len() + DRAWIO_CLOSING.len());
            prompt.push_str(DRAWIO_BASE);
            prompt.push_str(body);
            prompt.push_str(DRAWIO_CLOSING);
            prompt
        }
    }
}

fn mermaid_prompt(diagram_type: DiagramType) -> &'static str {
    match diagram_type {
        DiagramType::Flowchart => MERMAID_FLOWCHART,
        DiagramType::Architecture => MERMAID_ARCHITECTURE,
        DiagramType::Sequence => MERMAID_SEQUENCE,
        DiagramType::Er => MERMAID_ER,
        DiagramType::Gantt => MERMAID_GANTT,
        DiagramType::Class => MERMAID_CLASS,
        DiagramType::State => MERMAID_STATE,
        _ => MERMAID_FALLBACK,
    }
}

fn drawio_prompt(diagram_type: DiagramType) -> &'static str {
    match diagram_type {
        DiagramType::Flowchart => DRAWIO_FLOWCHART,
        DiagramType::Architecture => DRAWIO_ARCHITECTURE,
        DiagramType::Sequence => DRAWIO_SEQUENCE,
        DiagramType::Er => DRAWIO_ER,
        _ => DRAWIO_FALLBACK,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_every_pair_has_a_prompt() {
        for diagram_type in DiagramType::ALL {
            for format in [DiagramFormat::Mermaid, DiagramFormat::Drawio] {
                let prompt = prompt_for(diagram_type, format);
                assert!(
                    !prompt.trim().is_empty(),
                    "empty prompt for {diagram_type}/{format}"
                );
            }
        }
    }

    #[test]
    fn test_untabulated_mermaid_type_uses_fallback() {
        assert_eq!(
            prompt_for(DiagramType::Mindmap, DiagramFormat::Mermaid),
            MERMAID_FALLBACK
        );
        assert_eq!(
            prompt_for(DiagramType::Roadmap, DiagramFormat::Mermaid),
            MERMAID_FALLBACK
        );
    }

    #[test]
    fn test_tabulated_mermaid_type_is_specific() {
        let prompt = prompt_for(DiagramType::Sequence, DiagramFormat::Mermaid);
        assert!(prompt.contains("sequenceDiagram"));
        assert!(prompt.contains("no explanation"));
    }

    #[test]
    fn test_drawio_prompt_embeds_rules() {
        for diagram_type in DiagramType::ALL {
            let prompt = prompt_for(diagram_type, DiagramFormat::Drawio);
            assert!(prompt.contains("<?xml version=\"1.0\""));
            assert!(prompt.contains("<mxCell id=\"1\" parent=\"0\" />"));
            assert!(prompt.contains("starting at 2"));
            assert!(prompt.contains("80-120"));
            assert!(prompt.contains("150-200"));
            assert!(prompt.ends_with("Start directly with <?xml."));
        }
    }

    #[test]
    fn test_drawio_type_specific_sections() {
        let flowchart = prompt_for(DiagramType::Flowchart, DiagramFormat::Drawio);
        assert!(flowchart.contains("rhombus"));

        let swimlane = prompt_for(DiagramType::Swimlane, DiagramFormat::Drawio);
        assert!(swimlane.contains(DRAWIO_FALLBACK));
        assert!(!swimlane.contains("rhombus"));
    }
}
