//! Completion tracking for in-flight display-mode transitions.
//!
//! Each transition gets a fresh [`Generation`]. Its asynchronous sub-steps
//! report back with that generation, so a completion arriving after the
//! transition was superseded is recognised and discarded instead of being
//! counted against the newer one.

use log::{debug, warn};
use std::time::{Duration, Instant};

/// Identifies one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

/// Tracker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    /// No transition has started.
    Idle,
    /// Waiting for `remaining` of `expected` completions.
    Pending {
        /// Transition id.
        generation: Generation,
        /// Completions the transition needs.
        expected: u32,
        /// Completions still outstanding.
        remaining: u32,
        /// When the transition began.
        started: Instant,
        /// Whether the deadline has passed and been reported.
        timed_out: bool,
    },
    /// Every completion arrived.
    Done {
        /// Transition id.
        generation: Generation,
        /// When the transition began.
        started: Instant,
        /// When the last completion arrived.
        ended: Instant,
    },
}

/// Result of reporting one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The generation is not the one in flight; nothing changed.
    Stale,
    /// Completions still outstanding.
    Pending(u32),
    /// This was the last completion.
    Finished {
        /// Time from start to last completion.
        elapsed: Duration,
    },
}

/// Generation-tagged completion counter.
#[derive(Debug)]
pub struct ModeChangeTracker {
    state: TransitionState,
    next_generation: u64,
}

impl Default for ModeChangeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeChangeTracker {
    /// Create an idle tracker.
    pub fn new() -> Self {
        Self {
            state: TransitionState::Idle,
            next_generation: 1,
        }
    }

    /// Current state.
    pub fn state(&self) -> TransitionState {
        self.state
    }

    /// Start a transition expecting `expected` completions, superseding any
    /// transition still in flight.
    pub fn begin(&mut self, expected: u32) -> Generation {
        self.begin_at(expected, Instant::now())
    }

    pub(crate) fn begin_at(&mut self, expected: u32, now: Instant) -> Generation {
        if let TransitionState::Pending {
            generation,
            remaining,
            ..
        } = self.state
        {
            warn!(
                "superseding transition {:?} with {} completions outstanding",
                generation, remaining
            );
        }
        let generation = Generation(self.next_generation);
        self.next_generation += 1;
        self.state = if expected == 0 {
            TransitionState::Done {
                generation,
                started: now,
                ended: now,
            }
        } else {
            TransitionState::Pending {
                generation,
                expected,
                remaining: expected,
                started: now,
                timed_out: false,
            }
        };
        debug!("transition {:?} expects {} completions", generation, expected);
        generation
    }

    /// Report one completion for `generation`.
    pub fn complete(&mut self, generation: Generation) -> Completion {
        self.complete_at(generation, Instant::now())
    }

    pub(crate) fn complete_at(&mut self, generation: Generation, now: Instant) -> Completion {
        match self.state {
            TransitionState::Pending {
                generation: current,
                expected,
                remaining,
                started,
                timed_out,
            } if current == generation => {
                if remaining > 1 {
                    self.state = TransitionState::Pending {
                        generation,
                        expected,
                        remaining: remaining - 1,
                        started,
                        timed_out,
                    };
                    Completion::Pending(remaining - 1)
                } else {
                    let ended = now.max(started);
                    self.state = TransitionState::Done {
                        generation,
                        started,
                        ended,
                    };
                    Completion::Finished {
                        elapsed: ended - started,
                    }
                }
            }
            _ => {
                warn!("ignoring completion from stale transition {:?}", generation);
                Completion::Stale
            }
        }
    }

    /// Whether a transition is pending and younger than `timeout`.
    ///
    /// The first poll past the deadline marks the transition timed out and
    /// logs it; later polls stay quiet.
    pub fn is_running_at(&mut self, now: Instant, timeout: Duration) -> bool {
        match &mut self.state {
            TransitionState::Pending {
                generation,
                started,
                timed_out,
                ..
            } => {
                let elapsed = now.saturating_duration_since(*started);
                if elapsed <= timeout {
                    return true;
                }
                if !*timed_out {
                    *timed_out = true;
                    warn!(
                        "mode change {:?} timed out after {} ms",
                        generation,
                        elapsed.as_millis()
                    );
                }
                false
            }
            _ => false,
        }
    }

    /// Whether a transition is pending, regardless of age.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, TransitionState::Pending { .. })
    }

    /// Generation of the latest transition, if any.
    pub fn current_generation(&self) -> Option<Generation> {
        match self.state {
            TransitionState::Idle => None,
            TransitionState::Pending { generation, .. } | TransitionState::Done { generation, .. } => {
                Some(generation)
            }
        }
    }

    /// Start and end of the last finished transition.
    pub fn last_span(&self) -> Option<(Instant, Instant)> {
        match self.state {
            TransitionState::Done { started, ended, .. } => Some((started, ended)),
            _ => None,
        }
    }

    /// Move the start of the pending transition into the past.
    #[cfg(test)]
    pub(crate) fn backdate(&mut self, by: Duration) {
        if let TransitionState::Pending { started, .. } = &mut self.state {
            if let Some(earlier) = started.checked_sub(by) {
                *started = earlier;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_exactly_n_completions() {
        let mut tracker = ModeChangeTracker::new();
        let generation = tracker.begin(3);
        let timeout = Duration::from_millis(2000);

        assert_eq!(tracker.complete(generation), Completion::Pending(2));
        assert_eq!(tracker.complete(generation), Completion::Pending(1));
        assert!(tracker.is_running_at(Instant::now(), timeout));

        assert!(matches!(
            tracker.complete(generation),
            Completion::Finished { .. }
        ));
        assert!(!tracker.is_running_at(Instant::now(), timeout));
        let (started, ended) = tracker.last_span().unwrap();
        assert!(ended >= started);

        assert_eq!(tracker.complete(generation), Completion::Stale);
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let mut tracker = ModeChangeTracker::new();
        let old = tracker.begin(3);
        let new = tracker.begin(3);
        assert_ne!(old, new);

        assert_eq!(tracker.complete(old), Completion::Stale);
        assert_eq!(tracker.complete(new), Completion::Pending(2));
    }

    #[test]
    fn test_timeout_releases_running() {
        let mut tracker = ModeChangeTracker::new();
        tracker.begin(3);
        tracker.backdate(Duration::from_millis(2500));
        assert!(tracker.is_pending());
        assert!(!tracker.is_running_at(Instant::now(), Duration::from_millis(2000)));
    }

    #[test]
    fn test_timeout_is_reported_once() {
        let mut tracker = ModeChangeTracker::new();
        assert_eq!(tracker.state(), TransitionState::Idle);
        let generation = tracker.begin(3);
        let timeout = Duration::from_millis(2000);
        assert!(matches!(
            tracker.state(),
            TransitionState::Pending { remaining: 3, timed_out: false, .. }
        ));

        tracker.backdate(Duration::from_millis(2500));
        assert!(!tracker.is_running_at(Instant::now(), timeout));
        assert!(!tracker.is_running_at(Instant::now(), timeout));
        assert!(matches!(
            tracker.state(),
            TransitionState::Pending { timed_out: true, .. }
        ));

        // A late completion still counts against the timed-out transition.
        assert_eq!(tracker.complete(generation), Completion::Pending(2));
        assert!(matches!(
            tracker.state(),
            TransitionState::Pending { remaining: 2, timed_out: true, .. }
        ));
    }

    #[test]
    fn test_zero_expected_is_done() {
        let mut tracker = ModeChangeTracker::new();
        tracker.begin(0);
        assert!(!tracker.is_pending());
        assert!(tracker.last_span().is_some());
    }
}
