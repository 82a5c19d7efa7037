use crate::model::ImportSummary;
use serde::{Deserialize, Serialize};

/// Terminal result of one import run. Emitted exactly once, after the run
/// reaches `Done` or fails at the parent step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub success: bool,
    pub summary: ImportSummary,
    pub errors: Vec<String>,
}

impl RunOutcome {
    pub fn new(summary: ImportSummary, errors: Vec<String>) -> Self {
        RunOutcome {
            success: summary.overall_success(),
            summary,
            errors,
        }
    }
}

/// Messages relayed from a run to the calling surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ImportMessage {
    /// Incremental progress; emitted at least once per primitive call and
    /// once per item outcome.
    Progress {
        message: String,
        #[serde(rename = "isError")]
        is_error: bool,
    },
    /// Final summary and error list.
    Result {
        success: bool,
        summary: ImportSummary,
        errors: Vec<String>,
    },
}

impl ImportMessage {
    pub fn progress(message: impl Into<String>) -> Self {
        ImportMessage::Progress {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ImportMessage::Progress {
            message: message.into(),
            is_error: true,
        }
    }

    pub fn result(outcome: &RunOutcome) -> Self {
        ImportMessage::Result {
            success: outcome.success,
            summary: outcome.summary,
            errors: outcome.errors.clone(),
        }
    }
}
