//! Moderation decisions an administrator can request.

use murales_api_types::{ApproveRequest, RejectRequest};
use thiserror::Error;

pub const MIN_REJECTION_REASON_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionError {
    #[error("Please provide a reason for rejection")]
    MissingReason,
    #[error("Reason must be at least 10 characters")]
    ReasonTooShort,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApproveOptions {
    pub send_email: bool,
    pub message: String,
}

impl ApproveOptions {
    pub fn to_request(&self) -> ApproveRequest {
        ApproveRequest {
            send_email: self.send_email,
            message: self.message.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectOptions {
    pub reason: String,
    pub send_email: bool,
}

impl RejectOptions {
    /// The reason is sent trimmed and must carry at least
    /// [`MIN_REJECTION_REASON_CHARS`] characters.
    pub fn to_request(&self) -> Result<RejectRequest, RejectionError> {
        let reason = self.reason.trim();
        if reason.is_empty() {
            return Err(RejectionError::MissingReason);
        }
        if reason.chars().count() < MIN_REJECTION_REASON_CHARS {
            return Err(RejectionError::ReasonTooShort);
        }
        Ok(RejectRequest {
            reason: reason.to_string(),
            send_email: self.send_email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reject(reason: &str) -> RejectOptions {
        RejectOptions {
            reason: reason.to_string(),
            send_email: true,
        }
    }

    #[test]
    fn blank_reason_is_missing() {
        assert_eq!(reject("   ").to_request(), Err(RejectionError::MissingReason));
    }

    #[test]
    fn short_reason_is_rejected_after_trim() {
        assert_eq!(
            reject("  borroso  ").to_request(),
            Err(RejectionError::ReasonTooShort)
        );
    }

    #[test]
    fn reason_length_counts_characters_not_bytes() {
        let request = reject(" ñandúñandú ").to_request().expect("long enough");
        assert_eq!(request.reason, "ñandúñandú");
        assert!(request.send_email);
    }

    #[test]
    fn approve_message_is_trimmed() {
        let options = ApproveOptions {
            send_email: false,
            message: "  gracias!  ".into(),
        };
        assert_eq!(options.to_request().message, "gracias!");
    }
}
