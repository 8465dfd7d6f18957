use std::{fmt, str::FromStr};

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Tier {
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Silver, Tier::Gold, Tier::Platinum];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Platinum => "Platinum",
        }
    }

    pub fn duration_months(&self) -> u32 {
        match self {
            Tier::Silver => 1,
            Tier::Gold => 6,
            Tier::Platinum => 12,
        }
    }

    /// Flat discount per booking, in rupiah.
    pub fn discount(&self) -> i64 {
        match self {
            Tier::Silver => 10_000,
            Tier::Gold => 15_000,
            Tier::Platinum => 20_000,
        }
    }

    /// Calendar-month addition; day overflow clamps to the month's last day.
    pub fn expiry_for(&self, tanggal_daftar: NaiveDate) -> Option<NaiveDate> {
        tanggal_daftar.checked_add_months(Months::new(self.duration_months()))
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silver" => Ok(Tier::Silver),
            "gold" => Ok(Tier::Gold),
            "platinum" => Ok(Tier::Platinum),
            other => Err(format!("Invalid membership tier '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Inactive,
    Expired,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "active",
            MembershipStatus::Inactive => "inactive",
            MembershipStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(MembershipStatus::Active),
            "inactive" => Ok(MembershipStatus::Inactive),
            "expired" => Ok(MembershipStatus::Expired),
            other => Err(format!("Invalid membership status '{other}'")),
        }
    }
}

/// Discount a membership grants on `today`: the tier's flat amount while the
/// membership is active and not past its expiry date, zero otherwise.
pub fn discount_for(
    tier: Tier,
    status: MembershipStatus,
    expired_date: NaiveDate,
    today: NaiveDate,
) -> i64 {
    if status == MembershipStatus::Active && expired_date >= today {
        tier.discount()
    } else {
        0
    }
}

pub fn booking_price(hourly_rate: i64, discount: i64) -> i64 {
    (hourly_rate - discount).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn expiry_adds_calendar_months() {
        assert_eq!(Tier::Silver.expiry_for(d(2025, 3, 15)), Some(d(2025, 4, 15)));
        assert_eq!(Tier::Gold.expiry_for(d(2025, 3, 15)), Some(d(2025, 9, 15)));
        assert_eq!(Tier::Platinum.expiry_for(d(2025, 3, 15)), Some(d(2026, 3, 15)));
    }

    #[test]
    fn expiry_clamps_to_month_end() {
        assert_eq!(Tier::Silver.expiry_for(d(2025, 1, 31)), Some(d(2025, 2, 28)));
        assert_eq!(Tier::Silver.expiry_for(d(2024, 1, 31)), Some(d(2024, 2, 29)));
    }

    #[test]
    fn discount_requires_active_and_unexpired() {
        let today = d(2025, 6, 1);
        assert_eq!(
            discount_for(Tier::Gold, MembershipStatus::Active, d(2025, 6, 1), today),
            15_000
        );
        assert_eq!(
            discount_for(Tier::Gold, MembershipStatus::Active, d(2025, 5, 31), today),
            0
        );
        assert_eq!(
            discount_for(Tier::Platinum, MembershipStatus::Inactive, d(2026, 1, 1), today),
            0
        );
        assert_eq!(
            discount_for(Tier::Silver, MembershipStatus::Expired, d(2026, 1, 1), today),
            0
        );
    }

    #[test]
    fn price_never_goes_negative() {
        assert_eq!(booking_price(60_000, Tier::Platinum.discount()), 40_000);
        assert_eq!(booking_price(15_000, Tier::Platinum.discount()), 0);
    }

    #[test]
    fn tier_parsing_accepts_any_case() {
        assert_eq!("gold".parse::<Tier>().unwrap(), Tier::Gold);
        assert_eq!("PLATINUM".parse::<Tier>().unwrap(), Tier::Platinum);
        assert!("bronze".parse::<Tier>().is_err());
    }
}
