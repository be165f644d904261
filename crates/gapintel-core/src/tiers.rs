use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Subscription plan level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Starter,
    Pro,
    Enterprise,
}

impl Tier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Starter => "starter",
            Tier::Pro => "pro",
            Tier::Enterprise => "enterprise",
        }
    }

    /// Reports allowed per billing month. `None` means unlimited.
    #[must_use]
    pub fn monthly_report_quota(self) -> Option<u32> {
        match self {
            Tier::Free => Some(1),
            Tier::Starter => Some(5),
            Tier::Pro => Some(20),
            Tier::Enterprise => None,
        }
    }

    /// Paid tiers receive the premium section of the analysis.
    #[must_use]
    pub fn includes_premium(self) -> bool {
        !matches!(self, Tier::Free)
    }

    /// Whether another report fits in the quota given this month's usage.
    #[must_use]
    pub fn allows_another_report(self, used_this_month: u32) -> bool {
        self.monthly_report_quota()
            .is_none_or(|quota| used_this_month < quota)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "starter" => Ok(Tier::Starter),
            "pro" => Ok(Tier::Pro),
            "enterprise" => Ok(Tier::Enterprise),
            _ => Err(CoreError::InvalidTier(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_table() {
        assert_eq!(Tier::Free.monthly_report_quota(), Some(1));
        assert_eq!(Tier::Starter.monthly_report_quota(), Some(5));
        assert_eq!(Tier::Pro.monthly_report_quota(), Some(20));
        assert_eq!(Tier::Enterprise.monthly_report_quota(), None);
    }

    #[test]
    fn quota_is_exclusive_upper_bound() {
        assert!(Tier::Free.allows_another_report(0));
        assert!(!Tier::Free.allows_another_report(1));
        assert!(Tier::Starter.allows_another_report(4));
        assert!(!Tier::Starter.allows_another_report(5));
        assert!(Tier::Enterprise.allows_another_report(10_000));
    }

    #[test]
    fn premium_is_paid_only() {
        assert!(!Tier::Free.includes_premium());
        assert!(Tier::Starter.includes_premium());
        assert!(Tier::Enterprise.includes_premium());
    }

    #[test]
    fn parse_round_trips_display() {
        for tier in [Tier::Free, Tier::Starter, Tier::Pro, Tier::Enterprise] {
            assert_eq!(tier.to_string().parse::<Tier>().unwrap(), tier);
        }
        assert!(matches!(
            "platinum".parse::<Tier>(),
            Err(CoreError::InvalidTier(_))
        ));
    }
}
