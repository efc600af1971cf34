//! Parcel lifecycle status and transition rules.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::StatusId;

/// Parcel lifecycle status.
///
/// Discriminants match the 1-based seed order of the `parcel_statuses`
/// lookup table.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    Deposited = 1,
    PickedUp = 2,
    Missing = 3,
    RetractedBySender = 4,
    PickupDisputed = 5,
    ReturnToSender = 6,
}

impl ParcelStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Decode a database status ID.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Deposited),
            2 => Some(Self::PickedUp),
            3 => Some(Self::Missing),
            4 => Some(Self::RetractedBySender),
            5 => Some(Self::PickupDisputed),
            6 => Some(Self::ReturnToSender),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposited => "deposited",
            Self::PickedUp => "picked_up",
            Self::Missing => "missing",
            Self::RetractedBySender => "retracted_by_sender",
            Self::PickupDisputed => "pickup_disputed",
            Self::ReturnToSender => "return_to_sender",
        }
    }

    /// Terminal parcels are immutable.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::PickedUp | Self::Missing | Self::ReturnToSender)
    }

    /// Whether moving from `self` to `to` is a legal transition.
    ///
    /// A deposited parcel can be picked up, reported missing, retracted by
    /// its sender, or flagged as a disputed pickup. A disputed pickup is
    /// closed by admin resolution into one of the terminal states.
    pub fn can_transition(self, to: ParcelStatus) -> bool {
        use ParcelStatus::*;
        matches!(
            (self, to),
            (Deposited, PickedUp)
                | (Deposited, Missing)
                | (Deposited, RetractedBySender)
                | (Deposited, PickupDisputed)
                | (PickupDisputed, PickedUp)
                | (PickupDisputed, Missing)
                | (PickupDisputed, ReturnToSender)
        )
    }

    /// Validate a transition, producing the domain error on rejection.
    pub fn check_transition(self, to: ParcelStatus) -> Result<(), CoreError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                from: self.as_str(),
                to: to.as_str(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ParcelStatus::*;

    #[test]
    fn id_roundtrip() {
        for status in [
            Deposited,
            PickedUp,
            Missing,
            RetractedBySender,
            PickupDisputed,
            ReturnToSender,
        ] {
            assert_eq!(ParcelStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(ParcelStatus::from_id(7), None);
    }

    #[test]
    fn deposited_outgoing_transitions() {
        assert!(Deposited.can_transition(PickedUp));
        assert!(Deposited.can_transition(Missing));
        assert!(Deposited.can_transition(RetractedBySender));
        assert!(Deposited.can_transition(PickupDisputed));
        assert!(!Deposited.can_transition(ReturnToSender));
    }

    #[test]
    fn terminal_statuses_have_no_outgoing_transitions() {
        for terminal in [PickedUp, Missing, ReturnToSender] {
            assert!(terminal.is_terminal());
            for target in [
                Deposited,
                PickedUp,
                Missing,
                RetractedBySender,
                PickupDisputed,
                ReturnToSender,
            ] {
                assert!(!terminal.can_transition(target));
            }
        }
    }

    #[test]
    fn disputed_pickup_resolves_to_terminal_states() {
        assert!(PickupDisputed.can_transition(PickedUp));
        assert!(PickupDisputed.can_transition(Missing));
        assert!(PickupDisputed.can_transition(ReturnToSender));
        assert!(!PickupDisputed.can_transition(Deposited));
    }

    #[test]
    fn retracted_is_final_in_practice() {
        // Not in the terminal set, but nothing transitions out of it.
        assert!(!RetractedBySender.is_terminal());
        for target in [Deposited, PickedUp, Missing, PickupDisputed, ReturnToSender] {
            assert!(!RetractedBySender.can_transition(target));
        }
    }
}
