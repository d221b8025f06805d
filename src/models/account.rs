//! Account roles and signup approval

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::utils::errors::{GuestListError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Host,
    Venue,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Approved,
    Pending,
}

impl AccountRole {
    /// Approval state a fresh signup starts in. Venue accounts wait for an
    /// admin; hosts and admins are active immediately.
    pub fn initial_approval(&self) -> ApprovalStatus {
        match self {
            AccountRole::Venue => ApprovalStatus::Pending,
            AccountRole::Host | AccountRole::Admin => ApprovalStatus::Approved,
        }
    }
}

impl FromStr for AccountRole {
    type Err = GuestListError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "host" => Ok(AccountRole::Host),
            "venue" => Ok(AccountRole::Venue),
            "admin" => Ok(AccountRole::Admin),
            other => Err(GuestListError::InvalidInput(format!("Unknown account role: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_approval() {
        assert_eq!(AccountRole::Host.initial_approval(), ApprovalStatus::Approved);
        assert_eq!(AccountRole::Venue.initial_approval(), ApprovalStatus::Pending);
        assert_eq!(AccountRole::Admin.initial_approval(), ApprovalStatus::Approved);
        assert_eq!("VENUE".parse::<AccountRole>().unwrap(), AccountRole::Venue);
    }
}
