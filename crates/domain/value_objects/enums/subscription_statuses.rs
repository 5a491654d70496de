use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use super::UnknownVariant;

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Cancel,
    Expired,
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancel => "cancel",
            SubscriptionStatus::Expired => "expired",
        };
        write!(f, "{}", status)
    }
}

impl FromStr for SubscriptionStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(SubscriptionStatus::Active),
            "cancel" => Ok(SubscriptionStatus::Cancel),
            "expired" => Ok(SubscriptionStatus::Expired),
            other => Err(UnknownVariant {
                kind: "subscription status",
                value: other.to_string(),
            }),
        }
    }
}
