//! Pipeline state machine.
//!
//! Valid transitions for one recording cycle:
//! - Idle -> Recording (capture started)
//! - Recording -> Transcribing (capture finalized, audio submitted)
//! - Transcribing -> Formatting (transcript received)
//! - Formatting -> CopyingToClipboard (formatted text received)
//! - CopyingToClipboard -> Idle (cycle complete)
//! - any non-Idle state -> Error (stage failure)
//! - Error -> Idle (failure reported, ready for retry)

use std::fmt;

/// Where the pipeline currently is in the record-to-clipboard cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Nothing in flight. Ready to start.
    Idle,
    /// Capturing microphone audio.
    Recording,
    /// Waiting on the speech-to-text API.
    Transcribing,
    /// Waiting on the chat-completion API.
    Formatting,
    /// Writing the result to the clipboard.
    CopyingToClipboard,
    /// A stage failed; absorbed on the way back to Idle.
    Error,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "Idle"),
            PipelineState::Recording => write!(f, "Recording"),
            PipelineState::Transcribing => write!(f, "Transcribing"),
            PipelineState::Formatting => write!(f, "Formatting"),
            PipelineState::CopyingToClipboard => write!(f, "CopyingToClipboard"),
            PipelineState::Error => write!(f, "Error"),
        }
    }
}

impl PipelineState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, target),
            (Idle, Recording)
                | (Recording, Transcribing)
                | (Transcribing, Formatting)
                | (Formatting, CopyingToClipboard)
                | (CopyingToClipboard, Idle)
                // Failure transitions
                | (Recording, Error)
                | (Transcribing, Error)
                | (Formatting, Error)
                | (CopyingToClipboard, Error)
                | (Error, Idle)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(PipelineState::Idle.to_string(), "Idle");
        assert_eq!(PipelineState::Recording.to_string(), "Recording");
        assert_eq!(PipelineState::Transcribing.to_string(), "Transcribing");
        assert_eq!(PipelineState::Formatting.to_string(), "Formatting");
        assert_eq!(
            PipelineState::CopyingToClipboard.to_string(),
            "CopyingToClipboard"
        );
        assert_eq!(PipelineState::Error.to_string(), "Error");
    }

    #[test]
    fn test_success_path_transitions() {
        use PipelineState::*;
        assert!(Idle.can_transition_to(&Recording));
        assert!(Recording.can_transition_to(&Transcribing));
        assert!(Transcribing.can_transition_to(&Formatting));
        assert!(Formatting.can_transition_to(&CopyingToClipboard));
        assert!(CopyingToClipboard.can_transition_to(&Idle));
    }

    #[test]
    fn test_error_is_reachable_from_every_non_idle_state() {
        use PipelineState::*;
        for state in [Recording, Transcribing, Formatting, CopyingToClipboard] {
            assert!(state.can_transition_to(&Error), "{state} -> Error");
        }
        assert!(!Idle.can_transition_to(&Error));
        assert!(Error.can_transition_to(&Idle));
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        use PipelineState::*;
        // Cannot skip stages.
        assert!(!Idle.can_transition_to(&Transcribing));
        assert!(!Recording.can_transition_to(&Formatting));
        assert!(!Transcribing.can_transition_to(&CopyingToClipboard));

        // Cannot go backwards.
        assert!(!Transcribing.can_transition_to(&Recording));
        assert!(!Formatting.can_transition_to(&Transcribing));

        // Cannot transition to self.
        for state in [Idle, Recording, Transcribing, Formatting, CopyingToClipboard, Error] {
            assert!(!state.can_transition_to(&state));
        }
    }
}
