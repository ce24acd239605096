//! Single-flight reveal scheduler.
//!
//! Agent lines are queued as `(text, delay)` pairs. Only the head of the
//! queue is ever armed; the next line's delay starts when the previous one
//! has been revealed, so delays never overlap. The queue does not sleep;
//! the engine asks for the armed deadline and reports back once it passes.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use super::script::ScriptedLine;
use super::state::DialogStep;

/// An agent line waiting to be revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    pub text: String,
    pub delay: Duration,
    /// Step to enter once this line is on screen.
    pub then: Option<DialogStep>,
}

impl Reveal {
    pub fn new(text: impl Into<String>, delay: Duration) -> Self {
        Self {
            text: text.into(),
            delay,
            then: None,
        }
    }

    pub fn then(mut self, step: DialogStep) -> Self {
        self.then = Some(step);
        self
    }
}

impl From<&ScriptedLine> for Reveal {
    fn from(line: &ScriptedLine) -> Self {
        Reveal::new(line.text.clone(), line.delay())
    }
}

impl From<ScriptedLine> for Reveal {
    fn from(line: ScriptedLine) -> Self {
        let delay = line.delay();
        Reveal::new(line.text, delay)
    }
}

#[derive(Debug)]
struct Armed {
    reveal: Reveal,
    due: Instant,
}

#[derive(Debug, Default)]
pub struct RevealQueue {
    pending: VecDeque<Reveal>,
    armed: Option<Armed>,
}

impl RevealQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, reveal: Reveal) {
        self.pending.push_back(reveal);
    }

    pub fn extend(&mut self, reveals: impl IntoIterator<Item = Reveal>) {
        self.pending.extend(reveals);
    }

    /// Arm the head of the queue if nothing is armed yet, starting its delay
    /// at `now`. Returns the deadline of whatever is armed.
    pub fn arm(&mut self, now: Instant) -> Option<Instant> {
        if self.armed.is_none() {
            if let Some(reveal) = self.pending.pop_front() {
                let due = now + reveal.delay;
                tracing::debug!(delay_ms = reveal.delay.as_millis() as u64, "Reveal armed");
                self.armed = Some(Armed { reveal, due });
            }
        }
        self.deadline()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.armed.as_ref().map(|a| a.due)
    }

    /// Take the armed reveal if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<Reveal> {
        match &self.armed {
            Some(armed) if armed.due <= now => self.armed.take().map(|a| a.reveal),
            _ => None,
        }
    }

    /// Nothing armed and nothing queued.
    pub fn is_idle(&self) -> bool {
        self.armed.is_none() && self.pending.is_empty()
    }

    /// Lines not yet revealed, armed one included.
    pub fn len(&self) -> usize {
        self.pending.len() + usize::from(self.armed.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
