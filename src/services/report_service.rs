use chrono::{Datelike, NaiveDate};

use crate::{
    db::DbPool,
    domain::status::BookingStatus,
    dto::reports::{RevenueReport, RevenueRow},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    response::{ApiResponse, Meta},
    routes::params::DateRangeQuery,
    services::today,
    state::AppState,
};

/// Fills in the default range (start of the current month through today).
pub fn resolve_range(query: &DateRangeQuery, today: NaiveDate) -> AppResult<(NaiveDate, NaiveDate)> {
    let from = query.from.unwrap_or_else(|| today.with_day(1).unwrap_or(today));
    let to = query.to.unwrap_or(today);
    if from > to {
        return Err(AppError::BadRequest("'from' must not be after 'to'".into()));
    }
    Ok((from, to))
}

pub async fn fetch_revenue_rows(
    pool: &DbPool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<RevenueRow>, sqlx::Error> {
    sqlx::query_as::<_, RevenueRow>(
        r#"
        SELECT tanggal_booking AS tanggal,
               COALESCE(NULLIF(TRIM(metode_pembayaran), ''), '-') AS metode_pembayaran,
               COUNT(*) AS jumlah_booking,
               COALESCE(SUM(total_biaya), 0)::BIGINT AS total_pendapatan
        FROM booking
        WHERE status = ANY($1)
          AND tanggal_booking BETWEEN $2 AND $3
        GROUP BY 1, 2
        ORDER BY 1, 2
        "#,
    )
    .bind(BookingStatus::strings(&BookingStatus::REVENUE))
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}

/// Serves the last good report for the same range when the query fails and
/// that report is still within the cache TTL.
pub async fn build_revenue_report(
    state: &AppState,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<RevenueReport> {
    match fetch_revenue_rows(&state.pool, from, to).await {
        Ok(rows) => {
            let report = RevenueReport::new(from, to, rows);
            state.report_cache.insert((from, to), report.clone()).await;
            Ok(report)
        }
        Err(err) => match state.report_cache.get(&(from, to)).await {
            Some(mut cached) => {
                tracing::warn!(error = %err, %from, %to, "revenue query failed, serving cached report");
                cached.cached = true;
                Ok(cached)
            }
            None => Err(AppError::DbError(err)),
        },
    }
}

pub async fn revenue_report(
    state: &AppState,
    user: &AuthUser,
    query: DateRangeQuery,
) -> AppResult<ApiResponse<RevenueReport>> {
    ensure_staff(user)?;
    let (from, to) = resolve_range(&query, today())?;
    let report = build_revenue_report(state, from, to).await?;
    Ok(ApiResponse::success(
        "Revenue report",
        report,
        Some(Meta::empty()),
    ))
}

pub fn csv_filename(from: NaiveDate, to: NaiveDate) -> String {
    format!(
        "laporan_pendapatan_{}_{}.csv",
        from.format("%Y%m%d"),
        to.format("%Y%m%d")
    )
}

pub fn render_revenue_csv(report: &RevenueReport) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "tanggal",
        "metode_pembayaran",
        "jumlah_booking",
        "total_pendapatan",
    ])?;
    for row in &report.rows {
        writer.write_record([
            row.tanggal.format("%Y-%m-%d").to_string(),
            row.metode_pembayaran.clone(),
            row.jumlah_booking.to_string(),
            row.total_pendapatan.to_string(),
        ])?;
    }
    writer.write_record([
        "TOTAL".to_string(),
        String::new(),
        report.total_booking.to_string(),
        report.total_pendapatan.to_string(),
    ])?;
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Returns `(filename, csv body)`.
pub async fn revenue_report_csv(
    state: &AppState,
    user: &AuthUser,
    query: DateRangeQuery,
) -> AppResult<(String, String)> {
    ensure_staff(user)?;
    let (from, to) = resolve_range(&query, today())?;
    let report = build_revenue_report(state, from, to).await?;
    let body = render_revenue_csv(&report)?;
    Ok((csv_filename(from, to), body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn range_defaults_to_month_to_date() {
        let (from, to) = resolve_range(&DateRangeQuery::default(), d(2025, 8, 17)).unwrap();
        assert_eq!(from, d(2025, 8, 1));
        assert_eq!(to, d(2025, 8, 17));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let query = DateRangeQuery {
            from: Some(d(2025, 8, 10)),
            to: Some(d(2025, 8, 1)),
        };
        assert!(matches!(
            resolve_range(&query, d(2025, 8, 17)),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn report_totals_sum_rows() {
        let report = RevenueReport::new(
            d(2025, 8, 1),
            d(2025, 8, 2),
            vec![
                RevenueRow {
                    tanggal: d(2025, 8, 1),
                    metode_pembayaran: "cash".into(),
                    jumlah_booking: 2,
                    total_pendapatan: 110_000,
                },
                RevenueRow {
                    tanggal: d(2025, 8, 1),
                    metode_pembayaran: "qris".into(),
                    jumlah_booking: 1,
                    total_pendapatan: 60_000,
                },
            ],
        );
        assert_eq!(report.total_booking, 3);
        assert_eq!(report.total_pendapatan, 170_000);
        assert!(!report.cached);
    }

    #[test]
    fn csv_has_header_rows_and_total() {
        let report = RevenueReport::new(
            d(2025, 8, 1),
            d(2025, 8, 31),
            vec![RevenueRow {
                tanggal: d(2025, 8, 3),
                metode_pembayaran: "transfer, BCA".into(),
                jumlah_booking: 1,
                total_pendapatan: 45_000,
            }],
        );
        let csv = render_revenue_csv(&report).unwrap();
        assert_eq!(
            csv,
            "tanggal,metode_pembayaran,jumlah_booking,total_pendapatan\n\
             2025-08-03,\"transfer, BCA\",1,45000\n\
             TOTAL,,1,45000\n"
        );
        assert_eq!(
            csv_filename(report.from, report.to),
            "laporan_pendapatan_20250801_20250831.csv"
        );
    }
}
