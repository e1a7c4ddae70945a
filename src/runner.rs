//! Run-level driver: every conversation under the input root.
//!
//! Conversations are independent, so each one gets its own task. A semaphore
//! bounds how many run at once. The report keeps conversation order no matter
//! which task finishes first.

use crate::discovery::conversation_dirs;
use crate::error::Result;
use crate::media::merge::MergeExecutor;
use crate::media::probe::DurationResolver;
use crate::processor::ConversationProcessor;
use crate::report::{ConversationOutcome, FailureStage, RunReport};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Process every conversation directory under `input_dir`.
///
/// Only a missing or empty input root fails the run; conversation failures
/// end up in the report. `on_outcome` sees each outcome as soon as it is
/// known, in completion order.
pub async fn run<R, M, F>(
    input_dir: &Path,
    processor: Arc<ConversationProcessor<R, M>>,
    jobs: usize,
    mut on_outcome: F,
) -> Result<RunReport>
where
    R: DurationResolver + 'static,
    M: MergeExecutor + 'static,
    F: FnMut(&ConversationOutcome),
{
    let conversations = conversation_dirs(input_dir)?;
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));

    let mut tasks = JoinSet::new();
    let mut slot_of = HashMap::new();
    for (index, conversation) in conversations.iter().cloned().enumerate() {
        let processor = processor.clone();
        let semaphore = semaphore.clone();
        let handle = tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            processor.process(&conversation).await
        });
        slot_of.insert(handle.id(), index);
    }

    let mut slots: Vec<Option<ConversationOutcome>> = vec![None; conversations.len()];
    while let Some(joined) = tasks.join_next_with_id().await {
        let (id, outcome) = match joined {
            Ok((id, outcome)) => (id, outcome),
            Err(e) => {
                let id = e.id();
                let Some(&index) = slot_of.get(&id) else {
                    continue;
                };
                let outcome =
                    ConversationOutcome::failed(&conversations[index].id, FailureStage::Task, e);
                (id, outcome)
            }
        };

        on_outcome(&outcome);
        if let Some(&index) = slot_of.get(&id) {
            slots[index] = Some(outcome);
        }
    }

    let outcomes = slots
        .into_iter()
        .zip(&conversations)
        .map(|(slot, conversation)| {
            slot.unwrap_or_else(|| {
                ConversationOutcome::failed(
                    &conversation.id,
                    FailureStage::Task,
                    "task finished without an outcome",
                )
            })
        })
        .collect();

    Ok(RunReport::new(outcomes))
}
