use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, sqlx::FromRow)]
pub struct RevenueRow {
    pub tanggal: NaiveDate,
    pub metode_pembayaran: String,
    pub jumlah_booking: i64,
    pub total_pendapatan: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RevenueReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub rows: Vec<RevenueRow>,
    pub total_booking: i64,
    pub total_pendapatan: i64,
    /// True when served from the fallback cache after a database failure.
    pub cached: bool,
}

impl RevenueReport {
    pub fn new(from: NaiveDate, to: NaiveDate, rows: Vec<RevenueRow>) -> Self {
        let total_booking = rows.iter().map(|r| r.jumlah_booking).sum();
        let total_pendapatan = rows.iter().map(|r| r.total_pendapatan).sum();
        Self {
            from,
            to,
            rows,
            total_booking,
            total_pendapatan,
            cached: false,
        }
    }
}
