pub mod model;
pub mod repository;

pub use model::{BuildOutcome, Completion, Report};
pub use repository::{ReportHandle, ReportHistory, ReportRepository};
