//! Per-speaker channel timelines.
//!
//! Each turn contributes one segment to both channels: the speaker's channel
//! gets the clip, the other channel gets silence of the same duration. Both
//! timelines therefore always have one segment per turn and the same total
//! duration.

use crate::conversation::turn::{Role, Turn};
use crate::error::{CallstitchError, Result};
use std::fmt;

/// Index of a clip in the conversation's ordered input list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(pub usize);

/// One slot of a channel timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Speech { clip: ClipId, duration: f64 },
    Silence { duration: f64 },
}

impl Segment {
    pub fn duration(&self) -> f64 {
        match self {
            Segment::Speech { duration, .. } | Segment::Silence { duration } => *duration,
        }
    }

    pub fn is_speech(&self) -> bool {
        matches!(self, Segment::Speech { .. })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Speech { clip, duration } => {
                write!(f, "speech of clip {} ({:.6}s)", clip.0, duration)
            }
            Segment::Silence { duration } => write!(f, "silence ({:.6}s)", duration),
        }
    }
}

/// Ordered segments for one speaker.
pub type ChannelTimeline = Vec<Segment>;

/// The agent and customer channels of one conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Timelines {
    pub agent: ChannelTimeline,
    pub customer: ChannelTimeline,
}

impl Timelines {
    /// Build both channels from turns already in conversation order.
    ///
    /// Turn `i` becomes `ClipId(i)`.
    pub fn build(turns: &[Turn]) -> Result<Self> {
        if turns.is_empty() {
            return Err(CallstitchError::EmptyConversation);
        }

        let mut agent = Vec::with_capacity(turns.len());
        let mut customer = Vec::with_capacity(turns.len());

        for (index, turn) in turns.iter().enumerate() {
            let speech = Segment::Speech {
                clip: ClipId(index),
                duration: turn.duration,
            };
            let silence = Segment::Silence {
                duration: turn.duration,
            };

            match turn.role {
                Role::Agent => {
                    agent.push(speech);
                    customer.push(silence);
                }
                Role::Customer => {
                    agent.push(silence);
                    customer.push(speech);
                }
            }
        }

        Ok(Self { agent, customer })
    }

    /// Number of turns covered by the timelines.
    pub fn len(&self) -> usize {
        self.agent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agent.is_empty()
    }

    /// Total duration of the conversation in seconds.
    pub fn total_duration(&self) -> f64 {
        channel_duration(&self.agent)
    }

    pub fn channel(&self, role: Role) -> &ChannelTimeline {
        match role {
            Role::Agent => &self.agent,
            Role::Customer => &self.customer,
        }
    }

    /// Verify that every slot pairs one speech segment with silence of equal
    /// length on the other channel.
    pub fn check_alignment(&self) -> Result<()> {
        if self.is_empty() && self.customer.is_empty() {
            return Err(CallstitchError::EmptyConversation);
        }
        if self.agent.len() != self.customer.len() {
            return Err(CallstitchError::MisalignedTimelines {
                agent: self.agent.len(),
                customer: self.customer.len(),
            });
        }

        for (index, (a, c)) in self.agent.iter().zip(&self.customer).enumerate() {
            let paired = a.is_speech() != c.is_speech();
            if !paired || a.duration() != c.duration() {
                return Err(CallstitchError::MisalignedSegment {
                    index,
                    agent: a.to_string(),
                    customer: c.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Sum of segment durations in seconds.
pub fn channel_duration(timeline: &[Segment]) -> f64 {
    timeline.iter().map(Segment::duration).sum()
}
