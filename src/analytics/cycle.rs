//! Expiration contract-cycle classification.
//!
//! Calendar heuristic built on the third-Friday listing convention:
//! a Friday whose day-of-month falls in 15..=21 is treated as the
//! month's standard expiration, and the March/June/September/December
//! standards as the quarterly cycle. Exchange holidays occasionally
//! shift real expirations off the third Friday; those dates will be
//! labeled weekly here.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Contract cycle an expiration date trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpirationCycle {
    Weekly,
    Monthly,
    Quarterly,
}

impl ExpirationCycle {
    /// Classify an expiration date by calendar convention.
    pub fn classify(date: NaiveDate) -> Self {
        if date.weekday() == Weekday::Fri && (15..=21).contains(&date.day()) {
            if matches!(date.month(), 3 | 6 | 9 | 12) {
                Self::Quarterly
            } else {
                Self::Monthly
            }
        } else {
            Self::Weekly
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for ExpirationCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_third_friday_in_quarter_months() {
        assert_eq!(
            ExpirationCycle::classify(date(2024, 3, 15)),
            ExpirationCycle::Quarterly
        );
        assert_eq!(
            ExpirationCycle::classify(date(2024, 6, 21)),
            ExpirationCycle::Quarterly
        );
        assert_eq!(
            ExpirationCycle::classify(date(2024, 12, 20)),
            ExpirationCycle::Quarterly
        );
    }

    #[test]
    fn test_third_friday_in_other_months() {
        assert_eq!(
            ExpirationCycle::classify(date(2024, 1, 19)),
            ExpirationCycle::Monthly
        );
        assert_eq!(
            ExpirationCycle::classify(date(2024, 7, 19)),
            ExpirationCycle::Monthly
        );
    }

    #[test]
    fn test_everything_else_is_weekly() {
        // Mid-month Wednesday
        assert_eq!(
            ExpirationCycle::classify(date(2024, 1, 17)),
            ExpirationCycle::Weekly
        );
        // A Friday outside the third-Friday window
        assert_eq!(
            ExpirationCycle::classify(date(2024, 3, 8)),
            ExpirationCycle::Weekly
        );
        // Saturday inside the day window
        assert_eq!(
            ExpirationCycle::classify(date(2024, 3, 16)),
            ExpirationCycle::Weekly
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let d = date(2024, 3, 15);
        assert_eq!(ExpirationCycle::classify(d), ExpirationCycle::classify(d));
    }

    #[test]
    fn test_display() {
        assert_eq!(ExpirationCycle::Quarterly.to_string(), "quarterly");
        assert_eq!(ExpirationCycle::Weekly.as_str(), "weekly");
    }
}
