//! Ephemeral typing state: the stored indicator row and the local
//! Idle/Typing state machine that decides when to publish it.

use super::ids::{ContextId, UserId};

/// Typing indicator as stored and broadcast by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingIndicator {
    pub actor_id: UserId,
    pub context_id: Option<ContextId>,
    pub target_id: UserId,
    pub is_typing: bool,
    pub updated_at_ms: i64,
}

impl TypingIndicator {
    /// Active only while flagged and younger than the staleness window.
    pub fn is_active(&self, now_ms: i64, stale_after_ms: i64) -> bool {
        self.is_typing && now_ms.saturating_sub(self.updated_at_ms) < stale_after_ms
    }
}

/// Timing knobs for the local state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingTimings {
    pub idle_timeout_ms: i64,
    pub refresh_interval_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypingPhase {
    #[default]
    Idle,
    Typing {
        idle_deadline_ms: i64,
        last_published_ms: i64,
    },
}

/// What the caller should publish after a transition, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingSignal {
    Publish(bool),
    None,
}

/// Local typing state for one (context, counterpart) pair.
///
/// Holds at most one deadline; every keystroke replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypingSession {
    phase: TypingPhase,
}

impl TypingSession {
    #[cfg(test)]
    pub fn phase(&self) -> TypingPhase {
        self.phase
    }

    pub fn is_typing(&self) -> bool {
        matches!(self.phase, TypingPhase::Typing { .. })
    }

    /// Input text changed. Empty input ends typing immediately.
    pub fn on_input(&mut self, input_empty: bool, now_ms: i64, timings: TypingTimings) -> TypingSignal {
        if input_empty {
            return self.force_idle();
        }

        let idle_deadline_ms = now_ms.saturating_add(timings.idle_timeout_ms);
        match self.phase {
            TypingPhase::Idle => {
                self.phase = TypingPhase::Typing {
                    idle_deadline_ms,
                    last_published_ms: now_ms,
                };
                TypingSignal::Publish(true)
            }
            TypingPhase::Typing {
                last_published_ms, ..
            } => {
                let refresh_due =
                    now_ms.saturating_sub(last_published_ms) >= timings.refresh_interval_ms;
                self.phase = TypingPhase::Typing {
                    idle_deadline_ms,
                    last_published_ms: if refresh_due { now_ms } else { last_published_ms },
                };
                if refresh_due {
                    TypingSignal::Publish(true)
                } else {
                    TypingSignal::None
                }
            }
        }
    }

    /// Fires the inactivity deadline once it has passed.
    pub fn on_tick(&mut self, now_ms: i64) -> TypingSignal {
        match self.phase {
            TypingPhase::Typing {
                idle_deadline_ms, ..
            } if now_ms >= idle_deadline_ms => self.force_idle(),
            _ => TypingSignal::None,
        }
    }

    /// Send, close or empty input: go Idle right away, bypassing the timer.
    pub fn force_idle(&mut self) -> TypingSignal {
        match self.phase {
            TypingPhase::Idle => TypingSignal::None,
            TypingPhase::Typing { .. } => {
                self.phase = TypingPhase::Idle;
                TypingSignal::Publish(false)
            }
        }
    }
}
