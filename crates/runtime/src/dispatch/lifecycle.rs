//! Per-command lifecycle state machine.
//!
//! ```text
//! Constructed -> Validating -> Rejected
//!                           -> Dropped
//!                           -> Queued -> Applying -> Applied
//!                                                 -> Failed
//! ```
//!
//! Transitions only move forward; terminal phases accept nothing.

use serde::{Deserialize, Serialize};

use super::DispatchError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActionPhase {
    #[default]
    Constructed,
    Validating,
    Rejected,
    Dropped,
    Queued,
    Applying,
    Applied,
    Failed,
}

impl ActionPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Constructed => "constructed",
            Self::Validating => "validating",
            Self::Rejected => "rejected",
            Self::Dropped => "dropped",
            Self::Queued => "queued",
            Self::Applying => "applying",
            Self::Applied => "applied",
            Self::Failed => "failed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::Dropped | Self::Applied | Self::Failed
        )
    }

    pub const fn can_transition_to(self, next: ActionPhase) -> bool {
        matches!(
            (self, next),
            (Self::Constructed, Self::Validating)
                | (Self::Constructed, Self::Dropped)
                | (Self::Validating, Self::Rejected)
                | (Self::Validating, Self::Dropped)
                | (Self::Validating, Self::Queued)
                | (Self::Queued, Self::Applying)
                | (Self::Applying, Self::Applied)
                | (Self::Applying, Self::Failed)
        )
    }
}

/// Tracks one command through its phases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Lifecycle {
    phase: ActionPhase,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifecycle of an entry sequenced by the host and received over the
    /// wire; validation already happened there.
    pub fn replicated() -> Self {
        Self {
            phase: ActionPhase::Queued,
        }
    }

    pub fn phase(&self) -> ActionPhase {
        self.phase
    }

    /// Moves to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidTransition`] for backward or skipped
    /// transitions and for any transition out of a terminal phase.
    pub fn advance(&mut self, next: ActionPhase) -> Result<(), DispatchError> {
        if !self.phase.can_transition_to(next) {
            return Err(DispatchError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_reaches_applied() {
        let mut lifecycle = Lifecycle::new();
        for phase in [
            ActionPhase::Validating,
            ActionPhase::Queued,
            ActionPhase::Applying,
            ActionPhase::Applied,
        ] {
            lifecycle.advance(phase).unwrap();
        }
        assert!(lifecycle.phase().is_terminal());
    }

    #[test]
    fn queued_commands_cannot_be_dropped() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.advance(ActionPhase::Validating).unwrap();
        lifecycle.advance(ActionPhase::Queued).unwrap();

        let error = lifecycle.advance(ActionPhase::Dropped).unwrap_err();
        assert!(matches!(
            error,
            DispatchError::InvalidTransition {
                from: ActionPhase::Queued,
                to: ActionPhase::Dropped,
            }
        ));
    }

    #[test]
    fn terminal_phases_are_final() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.advance(ActionPhase::Validating).unwrap();
        lifecycle.advance(ActionPhase::Rejected).unwrap();

        assert!(lifecycle.advance(ActionPhase::Validating).is_err());
        assert_eq!(lifecycle.phase(), ActionPhase::Rejected);
    }
}
