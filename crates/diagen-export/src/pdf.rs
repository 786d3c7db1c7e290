//! Single-page PDF containers for rendered PNG images.
//!
//! PDF's `FlateDecode` filter with PNG predictors reads the same zlib data a
//! PNG decoder does, so the IDAT stream of an 8-bit, non-interlaced
//! grayscale or RGB image is embedded without decoding any pixels.
//!
//! mermaid-cli writes RGBA PNGs even with a white background, so its output
//! normally takes the other path: the image is composited onto white and
//! re-encoded as 8-bit RGB before embedding. The same applies to palette,
//! 16-bit, and interlaced images. Opaque pixels keep their exact colors.

use std::fmt::Write as _;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbImage};
use tracing::debug;

use crate::error::ExportError;

/// PNG file signature.
const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// CSS pixels per inch; page size is computed at this resolution.
const PIXELS_PER_INCH: f64 = 96.0;

/// PDF points per inch.
const POINTS_PER_INCH: f64 = 72.0;

/// Header fields of a PNG image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ihdr {
    width: u32,
    height: u32,
    bit_depth: u8,
    color_type: u8,
    interlace: u8,
}

impl Ihdr {
    /// Number of color components if the image can be embedded directly.
    fn passthrough_colors(self) -> Option<u8> {
        if self.bit_depth != 8 || self.interlace != 0 {
            return None;
        }
        match self.color_type {
            0 => Some(1),
            2 => Some(3),
            _ => None,
        }
    }
}

/// Parsed PNG: header plus concatenated IDAT payload.
#[derive(Debug)]
struct Png {
    header: Ihdr,
    data: Vec<u8>,
}

/// Parse the chunks of a PNG file.
fn parse_png(bytes: &[u8]) -> Result<Png, ExportError> {
    let invalid = |msg: &str| ExportError::InvalidRaster(msg.to_owned());

    let mut rest = bytes
        .strip_prefix(PNG_SIGNATURE.as_slice())
        .ok_or_else(|| invalid("missing PNG signature"))?;

    let mut header = None;
    let mut data = Vec::new();

    while rest.len() >= 12 {
        let length = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
        let kind = &rest[4..8];
        let body = rest
            .get(8..8 + length)
            .ok_or_else(|| invalid("truncated chunk"))?;

        match kind {
            b"IHDR" if body.len() >= 13 => {
                header = Some(Ihdr {
                    width: u32::from_be_bytes([body[0], body[1], body[2], body[3]]),
                    height: u32::from_be_bytes([body[4], body[5], body[6], body[7]]),
                    bit_depth: body[8],
                    color_type: body[9],
                    interlace: body[12],
                });
            }
            b"IDAT" => data.extend_from_slice(body),
            b"IEND" => break,
            _ => {}
        }

        // Skip length, type, body, and CRC.
        rest = rest.get(12 + length..).unwrap_or_default();
    }

    let header = header.ok_or_else(|| invalid("missing IHDR chunk"))?;
    if header.width == 0 || header.height == 0 {
        return Err(invalid("zero image dimensions"));
    }
    if data.is_empty() {
        return Err(invalid("missing IDAT data"));
    }
    Ok(Png { header, data })
}

/// Composite `bytes` onto a white background and re-encode as 8-bit RGB PNG.
fn flatten(bytes: &[u8]) -> Result<Vec<u8>, ExportError> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| ExportError::InvalidRaster(e.to_string()))?;
    let rgba = decoded.to_rgba8();

    let rgb = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let over_white = |c: u8| {
            let (c, a) = (u32::from(c), u32::from(a));
            u8::try_from((c * a + 255 * (255 - a) + 127) / 255).unwrap_or(u8::MAX)
        };
        image::Rgb([over_white(r), over_white(g), over_white(b)])
    });

    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| ExportError::InvalidRaster(e.to_string()))?;
    Ok(out)
}

/// Wrap PNG bytes in a one-page PDF sized to the image at 96 DPI.
pub fn wrap_png(bytes: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut png = parse_png(bytes)?;
    let colors = match png.header.passthrough_colors() {
        Some(colors) => colors,
        None => {
            debug!(
                color_type = png.header.color_type,
                bit_depth = png.header.bit_depth,
                interlace = png.header.interlace,
                "Flattening PNG before PDF embedding"
            );
            png = parse_png(&flatten(bytes)?)?;
            png.header
                .passthrough_colors()
                .ok_or_else(|| ExportError::InvalidRaster("unexpected flattened PNG".to_owned()))?
        }
    };
    Ok(build_pdf(&png, colors))
}

/// Page size in points for an image `px` pixels long.
fn points(px: u32) -> f64 {
    f64::from(px) * POINTS_PER_INCH / PIXELS_PER_INCH
}

fn build_pdf(png: &Png, colors: u8) -> Vec<u8> {
    let Ihdr { width, height, .. } = png.header;
    let (page_w, page_h) = (points(width), points(height));
    let color_space = if colors == 1 { "DeviceGray" } else { "DeviceRGB" };

    let mut pdf = PdfWriter::new();
    pdf.object(b"<< /Type /Catalog /Pages 2 0 R >>");
    pdf.object(b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    pdf.object(
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {page_w:.2} {page_h:.2}] \
             /Resources << /XObject << /Im0 4 0 R >> >> /Contents 5 0 R >>"
        )
        .as_bytes(),
    );
    pdf.stream(
        &format!(
            "/Type /XObject /Subtype /Image /Width {width} /Height {height} \
             /ColorSpace /{color_space} /BitsPerComponent 8 /Filter /FlateDecode \
             /DecodeParms << /Predictor 15 /Colors {colors} /BitsPerComponent 8 /Columns {width} >>"
        ),
        &png.data,
    );
    pdf.stream(
        "",
        format!("q {page_w:.2} 0 0 {page_h:.2} 0 0 cm /Im0 Do Q").as_bytes(),
    );
    pdf.finish()
}

/// Sequential writer of numbered PDF objects with a cross-reference table.
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = b"%PDF-1.4\n".to_vec();
        // Binary marker comment.
        buf.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn begin(&mut self) {
        self.offsets.push(self.buf.len());
        let id = self.offsets.len();
        self.buf.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
    }

    fn object(&mut self, body: &[u8]) {
        self.begin();
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    /// Stream object; `dict` holds extra entries besides `/Length`.
    fn stream(&mut self, dict: &str, data: &[u8]) {
        self.begin();
        let separator = if dict.is_empty() { "" } else { " " };
        self.buf.extend_from_slice(
            format!("<< {dict}{separator}/Length {} >>\nstream\n", data.len()).as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let size = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {size} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        );
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}
