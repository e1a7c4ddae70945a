//! Merge graph compilation.
//!
//! Turns the two channel timelines into a typed list of merge steps: normalize
//! every speech clip, generate every silence gap, concatenate each channel in
//! turn order, then place agent on the left and customer on the right of one
//! stereo stream. Text encoding for ffmpeg lives in `media::ffmpeg`.

use crate::conversation::timeline::{ClipId, Segment, Timelines};
use crate::defaults;
use crate::error::Result;
use std::fmt;

/// Name of an intermediate stream inside the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(String);

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// Label of the agent channel after concatenation.
pub const AGENT_CHANNEL: &str = "agent";
/// Label of the customer channel after concatenation.
pub const CUSTOMER_CHANNEL: &str = "customer";
/// Label of the final stereo stream.
pub const STEREO_OUTPUT: &str = "st";

/// One instruction of the merge graph.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeStep {
    /// Resample a source clip and convert it to mono with a fixed sample format.
    Normalize {
        clip: ClipId,
        sample_rate: u32,
        sample_format: &'static str,
        output: Label,
    },
    /// Rebase timestamps of a normalized clip to start at zero.
    ResetTimestamps { input: Label, output: Label },
    /// Generate mono silence of an exact duration in seconds.
    Silence {
        sample_rate: u32,
        duration: f64,
        output: Label,
    },
    /// Join streams end to end, in order.
    Concat { inputs: Vec<Label>, output: Label },
    /// Map two mono streams onto the left and right channels of one stereo stream.
    StereoCombine {
        left: Label,
        right: Label,
        output: Label,
    },
}

/// Complete merge description for one conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeGraph {
    pub sample_rate: u32,
    pub steps: Vec<MergeStep>,
    pub output: Label,
}

impl MergeGraph {
    /// Number of source clips the graph reads.
    pub fn clip_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, MergeStep::Normalize { .. }))
            .count()
    }
}

/// Compile aligned timelines into a merge graph.
///
/// Misaligned or empty timelines are rejected before any step is emitted.
pub fn compile(timelines: &Timelines, sample_rate: u32) -> Result<MergeGraph> {
    timelines.check_alignment()?;

    let mut steps = Vec::with_capacity(timelines.len() * 3 + 3);
    let agent = channel_steps(&timelines.agent, "a", sample_rate, &mut steps);
    let customer = channel_steps(&timelines.customer, "c", sample_rate, &mut steps);

    let agent_out = Label::new(AGENT_CHANNEL);
    let customer_out = Label::new(CUSTOMER_CHANNEL);
    steps.push(MergeStep::Concat {
        inputs: agent,
        output: agent_out.clone(),
    });
    steps.push(MergeStep::Concat {
        inputs: customer,
        output: customer_out.clone(),
    });

    let output = Label::new(STEREO_OUTPUT);
    steps.push(MergeStep::StereoCombine {
        left: agent_out,
        right: customer_out,
        output: output.clone(),
    });

    Ok(MergeGraph {
        sample_rate,
        steps,
        output,
    })
}

/// Emit the per-segment steps of one channel and return its segment labels in order.
fn channel_steps(
    timeline: &[Segment],
    prefix: &str,
    sample_rate: u32,
    steps: &mut Vec<MergeStep>,
) -> Vec<Label> {
    timeline
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            let output = Label::new(format!("{}{}", prefix, index));
            match segment {
                Segment::Speech { clip, .. } => {
                    let normalized = Label::new(format!("in{}", clip.0));
                    steps.push(MergeStep::Normalize {
                        clip: *clip,
                        sample_rate,
                        sample_format: defaults::SAMPLE_FORMAT,
                        output: normalized.clone(),
                    });
                    steps.push(MergeStep::ResetTimestamps {
                        input: normalized,
                        output: output.clone(),
                    });
                }
                Segment::Silence { duration } => {
                    steps.push(MergeStep::Silence {
                        sample_rate,
                        duration: *duration,
                        output: output.clone(),
                    });
                }
            }
            output
        })
        .collect()
}
