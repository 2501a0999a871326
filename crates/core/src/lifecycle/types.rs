//! Transfer status tracks.

use serde::{Deserialize, Serialize};

/// Direction of a transfer relative to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money leaving through an origin organisation.
    Outbound,
    /// Money paid out by a destination organisation.
    Inbound,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outbound => write!(f, "outbound"),
            Self::Inbound => write!(f, "inbound"),
        }
    }
}

/// Primary transfer status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    /// Captured but not yet submitted.
    Pending,
    /// Awaiting approval.
    PendingApproval,
    /// Assigned and ready for approval.
    Ready,
    /// Approved; funds locked/moved.
    Approved,
    /// Settled end to end.
    Completed,
    /// Cancelled before approval.
    Cancelled,
    /// Undone after approval.
    Reversed,
}

impl TransferStatus {
    /// True once no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Reversed)
    }

    /// True while the transfer may still be edited.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Pending | Self::PendingApproval)
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::PendingApproval => "PENDING_APPROVAL",
            Self::Ready => "READY",
            Self::Approved => "APPROVED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Reversed => "REVERSED",
        };
        write!(f, "{s}")
    }
}

/// Remittance track: where the money physically is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemittanceStatus {
    /// Nothing has moved yet.
    Pending,
    /// Available for pickup.
    Ready,
    /// In transit between organisations.
    Transit,
    /// Paid out to the beneficiary.
    Paid,
}

impl std::fmt::Display for RemittanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Ready => "READY",
            Self::Transit => "TRANSIT",
            Self::Paid => "PAID",
        };
        write!(f, "{s}")
    }
}

/// Request track mirrored back to the request layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Submitted.
    Pending,
    /// Assigned and ready.
    Ready,
    /// Approved.
    Approved,
    /// Settled.
    Completed,
    /// Cancelled.
    Cancelled,
    /// Reversed.
    Reversed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(TransferStatus::Completed.is_terminal());
        assert!(TransferStatus::Cancelled.is_terminal());
        assert!(TransferStatus::Reversed.is_terminal());
        assert!(!TransferStatus::Pending.is_terminal());
        assert!(!TransferStatus::Approved.is_terminal());
    }

    #[test]
    fn test_editable_statuses() {
        assert!(TransferStatus::Pending.is_editable());
        assert!(TransferStatus::PendingApproval.is_editable());
        assert!(!TransferStatus::Ready.is_editable());
        assert!(!TransferStatus::Approved.is_editable());
    }

    #[test]
    fn test_status_display_matches_wire_form() {
        assert_eq!(TransferStatus::PendingApproval.to_string(), "PENDING_APPROVAL");
        assert_eq!(RemittanceStatus::Transit.to_string(), "TRANSIT");
        assert_eq!(Direction::Inbound.to_string(), "inbound");
    }
}
