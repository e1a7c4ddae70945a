//! One conversation, end to end.
//!
//! list clips → assemble turns → probe durations → timelines → merge graph →
//! merge. Every failure stays inside the returned outcome.

use crate::conversation::graph::{MergeGraph, compile};
use crate::conversation::timeline::Timelines;
use crate::conversation::turn::{ParsedTurn, Turn, assemble};
use crate::discovery::{ConversationDir, clip_names, output_file_name};
use crate::error::{CallstitchError, Result};
use crate::media::merge::MergeExecutor;
use crate::media::probe::DurationResolver;
use crate::report::{ConversationOutcome, FailureStage};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};

/// Settings shared by every conversation of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorSettings {
    pub sample_rate: u32,
    pub output_dir: PathBuf,
    pub extension: String,
    /// Upper bound on concurrent duration probes within the conversation.
    pub probe_jobs: usize,
    /// 0 = quiet, 1 = per-conversation plan, 2 = per-turn detail.
    pub verbose: u8,
}

/// Drives the pure timeline core and the external tools for one conversation.
pub struct ConversationProcessor<R: DurationResolver, M: MergeExecutor> {
    resolver: R,
    merger: M,
    settings: ProcessorSettings,
}

impl<R: DurationResolver, M: MergeExecutor> ConversationProcessor<R, M> {
    pub fn new(resolver: R, merger: M, settings: ProcessorSettings) -> Self {
        Self {
            resolver,
            merger,
            settings,
        }
    }

    pub fn settings(&self) -> &ProcessorSettings {
        &self.settings
    }

    pub fn merger(&self) -> &M {
        &self.merger
    }

    /// Process the conversation stored in `conversation.path`.
    pub async fn process(&self, conversation: &ConversationDir) -> ConversationOutcome {
        let id = conversation.id.as_str();

        let names = match clip_names(&conversation.path) {
            Ok(names) => names,
            Err(e) => return ConversationOutcome::failed(id, FailureStage::Listing, e),
        };

        let parsed = match assemble(&names) {
            Ok(parsed) => parsed,
            Err(reason) => return ConversationOutcome::skipped(id, reason),
        };

        let turns = match self.resolve_turns(&conversation.path, parsed).await {
            Ok(turns) => turns,
            Err(e) => return ConversationOutcome::failed(id, FailureStage::Probe, e),
        };

        let (timelines, graph) = match self.plan(&turns) {
            Ok(planned) => planned,
            Err(e) => return ConversationOutcome::failed(id, FailureStage::Compile, e),
        };

        if self.settings.verbose >= 1 {
            eprintln!(
                "[{}] {} turns, {:.3}s per channel",
                id,
                timelines.len(),
                timelines.total_duration()
            );
        }

        let inputs: Vec<PathBuf> = turns.into_iter().map(|t| t.path).collect();
        match self.write(id, &graph, &inputs).await {
            Ok(output) => ConversationOutcome::created(
                id,
                output,
                timelines.len(),
                timelines.total_duration(),
            ),
            Err(e) => ConversationOutcome::failed(id, FailureStage::Merge, e),
        }
    }

    /// Probe turns with at most `probe_jobs` in flight, keeping turn order.
    /// The first failure aborts the conversation.
    async fn resolve_turns(&self, dir: &Path, parsed: Vec<ParsedTurn>) -> Result<Vec<Turn>> {
        let probes = parsed.into_iter().map(|turn| async move {
            let path = dir.join(&turn.file_name);
            let duration = self.resolver.duration(&path).await?;
            if self.settings.verbose >= 2 {
                eprintln!("  {} ({}): {:.3}s", turn.file_name, turn.role, duration);
            }
            Ok::<Turn, CallstitchError>(Turn::new(turn, path, duration))
        });

        stream::iter(probes)
            .buffered(self.settings.probe_jobs.max(1))
            .try_collect()
            .await
    }

    fn plan(&self, turns: &[Turn]) -> Result<(Timelines, MergeGraph)> {
        let timelines = Timelines::build(turns)?;
        let graph = compile(&timelines, self.settings.sample_rate)?;
        Ok((timelines, graph))
    }

    async fn write(&self, id: &str, graph: &MergeGraph, inputs: &[PathBuf]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.settings.output_dir).await?;

        let name = output_file_name(
            id,
            &self.settings.extension,
            chrono::Local::now().naive_local(),
        );
        let output = self.settings.output_dir.join(name);

        self.merger.merge(graph, inputs, &output).await?;
        Ok(output)
    }
}
