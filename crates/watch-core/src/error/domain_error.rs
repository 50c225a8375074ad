//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{MemberId, RoomId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid playback position: {0}")]
    InvalidPosition(f64),

    #[error("Invalid playback speed: {0}")]
    InvalidSpeed(f64),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Only the host may perform this action")]
    NotHost,

    #[error("Caller is not a member of this room")]
    NotInRoom,

    #[error("Access denied: wrong or missing room secret")]
    AccessDenied,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Already a member of this room")]
    AlreadyJoined,

    // =========================================================================
    // Throttling
    // =========================================================================
    #[error("Rate limited on {action}: retry after {retry_after_secs}s")]
    RateLimited {
        action: &'static str,
        retry_after_secs: u64,
    },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Command timed out: {0}")]
    Timeout(&'static str),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Get an error code string for transport adapters
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::RoomNotFound(_) => "ROOM_NOT_FOUND",
            Self::MemberNotFound(_) => "MEMBER_NOT_FOUND",

            // Validation
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidPosition(_) => "INVALID_POSITION",
            Self::InvalidSpeed(_) => "INVALID_SPEED",

            // Authorization
            Self::NotHost => "NOT_HOST",
            Self::NotInRoom => "NOT_IN_ROOM",
            Self::AccessDenied => "ACCESS_DENIED",

            // Conflict
            Self::AlreadyJoined => "ALREADY_JOINED",

            // Throttling
            Self::RateLimited { .. } => "RATE_LIMITED",

            // Infrastructure
            Self::Timeout(_) => "TIMEOUT",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RoomNotFound(_) | Self::MemberNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidPosition(_) | Self::InvalidSpeed(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotHost | Self::NotInRoom | Self::AccessDenied)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyJoined)
    }

    /// Check if this is a throttling error
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::RoomNotFound(RoomId::generate());
        assert_eq!(err.code(), "ROOM_NOT_FOUND");

        let err = DomainError::NotHost;
        assert_eq!(err.code(), "NOT_HOST");

        let err = DomainError::RateLimited {
            action: "playback_control",
            retry_after_secs: 1,
        };
        assert_eq!(err.code(), "RATE_LIMITED");
    }

    #[test]
    fn test_is_not_found() {
        assert!(DomainError::RoomNotFound(RoomId::generate()).is_not_found());
        assert!(DomainError::MemberNotFound(MemberId::new()).is_not_found());
        assert!(!DomainError::AlreadyJoined.is_not_found());
    }

    #[test]
    fn test_is_validation() {
        assert!(DomainError::InvalidPosition(-1.0).is_validation());
        assert!(DomainError::Validation("bad title".to_string()).is_validation());
        assert!(!DomainError::NotHost.is_validation());
    }

    #[test]
    fn test_is_authorization() {
        assert!(DomainError::NotHost.is_authorization());
        assert!(DomainError::NotInRoom.is_authorization());
        assert!(DomainError::AccessDenied.is_authorization());
        assert!(!DomainError::AlreadyJoined.is_authorization());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidPosition(-3.5);
        assert_eq!(err.to_string(), "Invalid playback position: -3.5");

        let err = DomainError::RateLimited {
            action: "room_create",
            retry_after_secs: 3600,
        };
        assert_eq!(
            err.to_string(),
            "Rate limited on room_create: retry after 3600s"
        );
    }
}
