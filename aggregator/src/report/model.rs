//! Build report models

use chrono::{DateTime, Utc};

/// Outcome of a build cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Cycle still running
    Pending,

    Success { device_count: usize },

    Failed { error: String },
}

impl BuildOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BuildOutcome::Pending)
    }
}

/// Terminal outcome handed to the report repository when a cycle ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Success { device_count: usize },
    Failed { error: String },
}

impl From<Completion> for BuildOutcome {
    fn from(completion: Completion) -> Self {
        match completion {
            Completion::Success { device_count } => BuildOutcome::Success { device_count },
            Completion::Failed { error } => BuildOutcome::Failed { error },
        }
    }
}

/// Record of one build cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub id: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub outcome: BuildOutcome,
}

impl Report {
    pub(crate) fn pending(id: u64, start_time: DateTime<Utc>) -> Self {
        Self {
            id,
            start_time,
            end_time: None,
            outcome: BuildOutcome::Pending,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.outcome.is_terminal()
    }

    pub fn is_successful(&self) -> bool {
        matches!(self.outcome, BuildOutcome::Success { .. })
    }

    pub fn device_count(&self) -> Option<usize> {
        match self.outcome {
            BuildOutcome::Success { device_count } => Some(device_count),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            BuildOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }
}
