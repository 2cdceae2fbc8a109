//! Role and gig lifecycle enums.

use serde::{Deserialize, Serialize};

/// Role of a registered user. A user owns exactly one matching profile
/// (a `Student` row for `Student`, a `Client` row for `Client`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Client => "CLIENT",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STUDENT" => Ok(Self::Student),
            "CLIENT" => Ok(Self::Client),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a gig. Created `Open`; the status endpoint moves it to
/// one of the other three states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GigStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl GigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// States a gig can be moved to via the status endpoint.
    /// `OPEN` is the creation state and is not a valid target.
    pub fn is_transition_target(&self) -> bool {
        !matches!(self, Self::Open)
    }
}

impl std::str::FromStr for GigStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl std::fmt::Display for GigStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for parsing an unrecognized enum string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);

/// Activity-log action names, as stored in the `activity_logs.action` column.
pub mod actions {
    use super::GigStatus;

    pub const GIG_CREATED: &str = "GIG_CREATED";
    pub const GIG_UPDATED: &str = "GIG_UPDATED";
    pub const STUDENT_APPLIED: &str = "STUDENT_APPLIED";

    pub fn gig_status_changed(status: GigStatus) -> String {
        format!("GIG_STATUS_CHANGED_TO_{}", status.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_round_trips_through_strings() {
        for role in [Role::Student, Role::Client] {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
        assert!(Role::from_str("ADMIN").is_err());
    }

    #[test]
    fn open_is_not_a_transition_target() {
        assert!(!GigStatus::Open.is_transition_target());
        assert!(GigStatus::InProgress.is_transition_target());
        assert!(GigStatus::Completed.is_transition_target());
        assert!(GigStatus::Cancelled.is_transition_target());
    }

    #[test]
    fn status_change_action_embeds_the_target() {
        assert_eq!(
            actions::gig_status_changed(GigStatus::Completed),
            "GIG_STATUS_CHANGED_TO_COMPLETED"
        );
    }
}
