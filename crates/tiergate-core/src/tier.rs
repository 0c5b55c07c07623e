//! Caller tiers and the classifier that maps an identity onto one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TierGateError;

/// Access tier of a caller. Declaration order is entitlement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// No identity presented.
    Anonymous,
    /// Logged in, no subscription.
    Authenticated,
    /// Paid subscriber.
    Premium,
    /// Administrator.
    Admin,
}

impl Tier {
    /// Every tier, lowest entitlement first.
    pub const ALL: [Tier; 4] = [Tier::Anonymous, Tier::Authenticated, Tier::Premium, Tier::Admin];

    /// Stable string id used in responses and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Anonymous => "anonymous",
            Tier::Authenticated => "authenticated",
            Tier::Premium => "premium",
            Tier::Admin => "admin",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tier::Anonymous => "Unregistered users with limited access to encourage signup",
            Tier::Authenticated => "Registered users with core functionality access",
            Tier::Premium => "Paid subscribers with advanced features and unlimited access",
            Tier::Admin => "System administrators with complete access and debug information",
        }
    }

    /// What the next step up looks like from this tier.
    pub fn upgrade_path(self) -> &'static str {
        match self {
            Tier::Anonymous => "Register for free to unlock authenticated features",
            Tier::Authenticated => "Upgrade to Premium for unlimited access",
            Tier::Premium => "You have full feature access",
            Tier::Admin => "You have complete system access",
        }
    }

    /// Tiers that never see upsell copy, whatever the exposure flags say.
    pub fn is_paying(self) -> bool {
        matches!(self, Tier::Premium | Tier::Admin)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = TierGateError;

    /// Case-insensitive; anything else is a client error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Tier::ALL
            .into_iter()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| TierGateError::InvalidTier(s.to_string()))
    }
}

/// What the classifier needs to know about an authenticated caller.
///
/// Resolution of the identity itself (sessions, tokens) happens upstream.
pub trait Identity {
    fn is_admin(&self) -> bool;
    fn is_premium(&self) -> bool;

    /// Optional user id, only surfaced by introspection.
    fn user_id(&self) -> Option<u64> {
        None
    }
}

/// Plain identity record used by the gateway and the demo preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Option<u64>,
    pub is_superuser: bool,
    pub is_premium: bool,
}

impl Caller {
    /// Identity whose flags classify back into `tier`.
    /// `None` for anonymous, which has no identity at all.
    pub fn for_tier(tier: Tier, user_id: u64) -> Option<Self> {
        match tier {
            Tier::Anonymous => None,
            _ => Some(Self {
                user_id: Some(user_id),
                is_superuser: tier == Tier::Admin,
                is_premium: tier.is_paying(),
            }),
        }
    }
}

impl Identity for Caller {
    fn is_admin(&self) -> bool {
        self.is_superuser
    }

    fn is_premium(&self) -> bool {
        self.is_premium
    }

    fn user_id(&self) -> Option<u64> {
        self.user_id
    }
}

/// Classify an optional caller. Administrator wins over premium.
pub fn classify(identity: Option<&dyn Identity>) -> Tier {
    match identity {
        None => Tier::Anonymous,
        Some(id) if id.is_admin() => Tier::Admin,
        Some(id) if id.is_premium() => Tier::Premium,
        Some(_) => Tier::Authenticated,
    }
}
