//! Pipeline stage entity and its per-run state machine
//!
//! ```text
//! Pending -> Validating -> Validated -> Applying -> Applied
//!                     \-> ValidationFailed   \-> ApplyFailed
//!                          Validated -> Skipped
//! ```

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Trigger;

/// What a stage requires of its predecessor before it may apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageGate {
    /// Predecessor did not fail (applied or skipped are both fine)
    #[default]
    PreviousSucceeded,
    /// Predecessor must have reached `Applied`
    PreviousApplied,
}

impl StageGate {
    /// Whether the gate passes given the predecessor's final status.
    ///
    /// The first stage has no predecessor and always passes.
    pub fn passes(&self, previous: Option<StageStatus>) -> bool {
        match (self, previous) {
            (_, None) => true,
            (StageGate::PreviousSucceeded, Some(status)) => !status.is_failure(),
            (StageGate::PreviousApplied, Some(status)) => status == StageStatus::Applied,
        }
    }
}

/// One environment's position in the promotion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
    /// Path of the stage's value set file
    pub values: PathBuf,
    pub trigger: Trigger,
    pub gate: StageGate,
}

impl Stage {
    pub fn new(name: impl Into<String>, values: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            values: values.into(),
            trigger: Trigger::always(),
            gate: StageGate::default(),
        }
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_gate(mut self, gate: StageGate) -> Self {
        self.gate = gate;
        self
    }
}

/// Status of a stage within one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Validating,
    Validated,
    ValidationFailed,
    Applying,
    Applied,
    ApplyFailed,
    Skipped,
}

impl StageStatus {
    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: StageStatus) -> bool {
        use StageStatus::*;
        matches!(
            (self, next),
            (Pending, Validating)
                | (Validating, Validated)
                | (Validating, ValidationFailed)
                | (Validated, Applying)
                | (Validated, Skipped)
                | (Applying, Applied)
                | (Applying, ApplyFailed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StageStatus::ValidationFailed
                | StageStatus::Applied
                | StageStatus::ApplyFailed
                | StageStatus::Skipped
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, StageStatus::ValidationFailed | StageStatus::ApplyFailed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Validating => "validating",
            StageStatus::Validated => "validated",
            StageStatus::ValidationFailed => "validation_failed",
            StageStatus::Applying => "applying",
            StageStatus::Applied => "applied",
            StageStatus::ApplyFailed => "apply_failed",
            StageStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StageStatus::*;

    const ALL: [StageStatus; 8] = [
        Pending,
        Validating,
        Validated,
        ValidationFailed,
        Applying,
        Applied,
        ApplyFailed,
        Skipped,
    ];

    #[test]
    fn test_happy_path_transitions_are_legal() {
        assert!(Pending.can_transition_to(Validating));
        assert!(Validating.can_transition_to(Validated));
        assert!(Validated.can_transition_to(Applying));
        assert!(Applying.can_transition_to(Applied));
    }

    #[test]
    fn test_skipped_is_only_reachable_from_validated() {
        for from in ALL {
            assert_eq!(from.can_transition_to(Skipped), from == Validated, "{from}");
        }
    }

    #[test]
    fn test_applying_is_only_reachable_from_validated() {
        for from in ALL {
            assert_eq!(from.can_transition_to(Applying), from == Validated, "{from}");
        }
    }

    #[test]
    fn test_terminal_states_have_no_outgoing_transitions() {
        for from in ALL.into_iter().filter(StageStatus::is_terminal) {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_gate_previous_succeeded_accepts_skipped_predecessor() {
        let gate = StageGate::PreviousSucceeded;
        assert!(gate.passes(None));
        assert!(gate.passes(Some(Applied)));
        assert!(gate.passes(Some(Skipped)));
        assert!(!gate.passes(Some(ValidationFailed)));
    }

    #[test]
    fn test_gate_previous_applied_requires_applied_predecessor() {
        let gate = StageGate::PreviousApplied;
        assert!(gate.passes(None));
        assert!(gate.passes(Some(Applied)));
        assert!(!gate.passes(Some(Skipped)));
    }

    #[test]
    fn test_gate_deserializes_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            gate: StageGate,
        }
        let w: Wrapper = toml::from_str("gate = \"previous-applied\"").unwrap();
        assert_eq!(w.gate, StageGate::PreviousApplied);
    }
}
