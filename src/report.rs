//! Per-conversation outcomes and the run-level report.

use crate::conversation::turn::SkipReason;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Step at which a conversation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Reading the conversation directory.
    Listing,
    /// Resolving clip durations.
    Probe,
    /// Building timelines or compiling the merge graph.
    Compile,
    /// Running the merge or preparing its output.
    Merge,
    /// The worker task itself died.
    Task,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureStage::Listing => "listing",
            FailureStage::Probe => "probe",
            FailureStage::Compile => "compile",
            FailureStage::Merge => "merge",
            FailureStage::Task => "task",
        };
        f.write_str(name)
    }
}

/// What happened to one conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Created {
        output: PathBuf,
        turns: usize,
        duration_secs: f64,
    },
    Skipped {
        reason: SkipReason,
    },
    Failed {
        stage: FailureStage,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationOutcome {
    pub id: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl ConversationOutcome {
    pub fn created(id: &str, output: PathBuf, turns: usize, duration_secs: f64) -> Self {
        Self {
            id: id.to_string(),
            status: OutcomeStatus::Created {
                output,
                turns,
                duration_secs,
            },
        }
    }

    pub fn skipped(id: &str, reason: SkipReason) -> Self {
        Self {
            id: id.to_string(),
            status: OutcomeStatus::Skipped { reason },
        }
    }

    pub fn failed(id: &str, stage: FailureStage, error: impl fmt::Display) -> Self {
        Self {
            id: id.to_string(),
            status: OutcomeStatus::Failed {
                stage,
                error: error.to_string(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed { .. })
    }
}

/// Outcomes of one run, in conversation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<ConversationOutcome>,
}

/// Outcome counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn new(outcomes: Vec<ConversationOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for outcome in &self.outcomes {
            match outcome.status {
                OutcomeStatus::Created { .. } => summary.created += 1,
                OutcomeStatus::Skipped { .. } => summary.skipped += 1,
                OutcomeStatus::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    /// True when at least one conversation failed. Skips do not count.
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(ConversationOutcome::is_failed)
    }

    pub fn get(&self, id: &str) -> Option<&ConversationOutcome> {
        self.outcomes.iter().find(|o| o.id == id)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Document<'a> {
            summary: Summary,
            conversations: &'a [ConversationOutcome],
        }

        serde_json::to_string_pretty(&Document {
            summary: self.summary(),
            conversations: &self.outcomes,
        })
    }
}
