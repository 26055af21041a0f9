//! The anonymous-vote switch.
//!
//! Elections that do not support anonymous voting never show the control;
//! that absence is a normal state, so toggling it is a silent no-op.

use votekit_types::ElectionMetadata;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnonymousMode {
    #[default]
    Unsupported,
    Available {
        enabled: bool,
    },
}

impl AnonymousMode {
    pub fn for_election(metadata: &ElectionMetadata) -> Self {
        if metadata.supports_anonymous {
            Self::Available { enabled: false }
        } else {
            Self::Unsupported
        }
    }

    /// The control's current value, or `None` when the control is hidden.
    pub fn control(&self) -> Option<bool> {
        match self {
            Self::Unsupported => None,
            Self::Available { enabled } => Some(*enabled),
        }
    }

    /// Set the switch. Returns whether the value was applied.
    pub fn set(&mut self, value: bool) -> bool {
        match self {
            Self::Unsupported => false,
            Self::Available { enabled } => {
                *enabled = value;
                true
            }
        }
    }

    /// The flag that goes into a submission request.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Available { enabled: true })
    }
}
