use std::fmt;

use serde::{Deserialize, Serialize};

/// Derived state of a subscription relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubscriptionStatus {
    Active,
    Expired,
    /// No expiry date on record, so nothing can be derived.
    #[default]
    Unknown,
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionStatus::Active => write!(f, "Active"),
            SubscriptionStatus::Expired => write!(f, "Expired"),
            SubscriptionStatus::Unknown => write!(f, "Unknown"),
        }
    }
}
