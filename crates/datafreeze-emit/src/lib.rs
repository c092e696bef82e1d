//! C# source emission for datafreeze.
//!
//! The emitter walks every data source, table, row and column in a fixed
//! order and renders one file of literal object initializers into memory.
//! Nothing touches the destination until the whole file has been rendered.

pub mod emitter;
pub mod errors;
pub mod model;
pub mod output;
pub mod project;
pub mod writer;

pub use emitter::{BoundSource, EmitContext, EmittedFile, Emitter};
pub use errors::EmitError;
pub use model::{EmitOptions, EmitReport, SkippedTable};
pub use output::{write_bytes_atomic, write_json_atomic};
pub use project::{DEFAULT_OUTPUT_FILE, FALLBACK_NAMESPACE, OutputTarget, resolve_output};
