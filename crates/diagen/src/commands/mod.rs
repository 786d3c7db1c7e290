//! CLI command implementations.

pub(crate) mod ai;
pub(crate) mod export;
pub(crate) mod serve;

pub(crate) use ai::{ExplainArgs, GenerateArgs, RefineArgs};
pub(crate) use export::ExportArgs;
pub(crate) use serve::ServeArgs;
