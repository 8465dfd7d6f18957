use chrono::NaiveDate;
use uuid::Uuid;

/// `BK-YYYYMMDD-xxxxxxxx`, dated by the booking day.
pub fn booking_id(tanggal_booking: NaiveDate) -> String {
    prefixed_id("BK", tanggal_booking)
}

/// `MBR-YYYYMMDD-xxxxxxxx`, dated by the registration day.
pub fn membership_id(tanggal_daftar: NaiveDate) -> String {
    prefixed_id("MBR", tanggal_daftar)
}

fn prefixed_id(prefix: &str, date: NaiveDate) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, date.format("%Y%m%d"), &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_ids_carry_date_and_random_suffix() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
        let a = booking_id(date);
        let b = booking_id(date);
        assert!(a.starts_with("BK-20250704-"));
        assert_eq!(a.len(), "BK-20250704-".len() + 8);
        assert_ne!(a, b);
    }

    #[test]
    fn membership_ids_use_own_prefix() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert!(membership_id(date).starts_with("MBR-20250102-"));
    }
}
