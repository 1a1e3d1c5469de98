//! Export and import orchestration.

pub mod export;
pub mod import;
pub mod state;

pub use export::{ExportOptions, ExportResult, ExportService, ExportSession};
pub use import::{ImportOptions, ImportResult, ImportService, ImportSession};
pub use state::{RunKind, RunState, RunTracker};
