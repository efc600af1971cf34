//! Locker sizes and the locker status state machine.
//!
//! Statuses and sizes are closed enums whose discriminants match the
//! 1-based seed order of the `locker_statuses` / `locker_sizes` lookup
//! tables, so an invalid status can never be represented past the
//! decoding boundary.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::StatusId;

// ---------------------------------------------------------------------------
// LockerSize
// ---------------------------------------------------------------------------

/// Physical locker size class.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockerSize {
    Small = 1,
    Medium = 2,
    Large = 3,
}

impl LockerSize {
    /// Return the database size ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Decode a database size ID.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Small),
            2 => Some(Self::Medium),
            3 => Some(Self::Large),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl std::str::FromStr for LockerSize {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            other => Err(CoreError::Validation(format!(
                "unknown locker size: {other} (expected small, medium, or large)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// LockerStatus
// ---------------------------------------------------------------------------

/// Locker lifecycle status.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockerStatus {
    Free = 1,
    Occupied = 2,
    OutOfService = 3,
    DisputedContents = 4,
}

impl LockerStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Decode a database status ID.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Free),
            2 => Some(Self::Occupied),
            3 => Some(Self::OutOfService),
            4 => Some(Self::DisputedContents),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Occupied => "occupied",
            Self::OutOfService => "out_of_service",
            Self::DisputedContents => "disputed_contents",
        }
    }

    /// Whether moving from `self` to `to` is a legal transition.
    ///
    /// Transitions happen either through the parcel lifecycle (assign on
    /// deposit, release on pickup/retract, disable on missing report,
    /// dispute) or by explicit admin action. Disputed lockers leave the
    /// disputed state only through admin resolution.
    pub fn can_transition(self, to: LockerStatus) -> bool {
        use LockerStatus::*;
        matches!(
            (self, to),
            (Free, Occupied)
                | (Occupied, Free)
                | (Occupied, OutOfService)
                | (Occupied, DisputedContents)
                | (Free, OutOfService)
                | (OutOfService, Free)
                | (DisputedContents, Free)
                | (DisputedContents, OutOfService)
        )
    }

    /// Validate a transition, producing the domain error on rejection.
    pub fn check_transition(self, to: LockerStatus) -> Result<(), CoreError> {
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

impl std::str::FromStr for LockerStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "occupied" => Ok(Self::Occupied),
            "out_of_service" => Ok(Self::OutOfService),
            "disputed_contents" => Ok(Self::DisputedContents),
            other => Err(CoreError::Validation(format!(
                "unknown locker status: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use LockerStatus::*;

    #[test]
    fn id_roundtrip() {
        for status in [Free, Occupied, OutOfService, DisputedContents] {
            assert_eq!(LockerStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(LockerStatus::from_id(0), None);
        assert_eq!(LockerStatus::from_id(99), None);
    }

    #[test]
    fn size_id_roundtrip() {
        for size in [LockerSize::Small, LockerSize::Medium, LockerSize::Large] {
            assert_eq!(LockerSize::from_id(size.id()), Some(size));
        }
        assert_eq!(LockerSize::from_id(4), None);
    }

    #[test]
    fn size_parses_from_wire_strings() {
        assert_eq!("small".parse::<LockerSize>().unwrap(), LockerSize::Small);
        assert_eq!("large".parse::<LockerSize>().unwrap(), LockerSize::Large);
        assert!("extra_large".parse::<LockerSize>().is_err());
    }

    #[test]
    fn assignment_and_release_transitions() {
        assert!(Free.can_transition(Occupied));
        assert!(Occupied.can_transition(Free));
    }

    #[test]
    fn admin_disable_from_free_and_occupied() {
        assert!(Free.can_transition(OutOfService));
        assert!(Occupied.can_transition(OutOfService));
    }

    #[test]
    fn enable_only_returns_to_free() {
        assert!(OutOfService.can_transition(Free));
        assert!(!OutOfService.can_transition(Occupied));
        assert!(!OutOfService.can_transition(DisputedContents));
    }

    #[test]
    fn dispute_requires_occupied() {
        assert!(Occupied.can_transition(DisputedContents));
        assert!(!Free.can_transition(DisputedContents));
        assert!(!OutOfService.can_transition(DisputedContents));
    }

    #[test]
    fn disputed_leaves_only_via_admin_resolution() {
        assert!(DisputedContents.can_transition(Free));
        assert!(DisputedContents.can_transition(OutOfService));
        assert!(!DisputedContents.can_transition(Occupied));
    }

    #[test]
    fn self_transitions_are_rejected() {
        for status in [Free, Occupied, OutOfService, DisputedContents] {
            assert!(!status.can_transition(status));
        }
    }

    #[test]
    fn check_transition_reports_both_states() {
        let err = OutOfService.check_transition(Occupied).unwrap_err();
        match err {
            CoreError::InvalidTransition { from, to } => {
                assert_eq!(from, "out_of_service");
                assert_eq!(to, "occupied");
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }
}
