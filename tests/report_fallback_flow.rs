mod common;

use chrono::{Duration, NaiveTime};
use sanguku_api::{
    domain::status::BookingStatus,
    dto::bookings::CreateBookingRequest,
    error::AppError,
    middleware::auth::Role,
    services::{booking_service, report_service, today},
};

// Once the database is unreachable, the last report for the same range is
// served from the cache; ranges never cached still fail.
#[tokio::test]
async fn revenue_report_falls_back_to_cache() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;
    let staff = common::staff_user(Role::Staff);
    let customer = common::create_customer(&state, "andi").await?;
    let day = today() + Duration::days(1);

    booking_service::create_booking(
        &state,
        &staff,
        CreateBookingRequest {
            pelanggan_id: Some(customer.user_id),
            tanggal_booking: day,
            jam_mulai: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            status: Some(BookingStatus::Paid),
            total_biaya: Some(50_000),
            metode_pembayaran: Some("transfer".into()),
        },
    )
    .await?;

    let fresh = report_service::build_revenue_report(&state, day, day).await?;
    assert!(!fresh.cached);
    assert_eq!(fresh.total_pendapatan, 50_000);

    state.pool.close().await;

    let cached = report_service::build_revenue_report(&state, day, day).await?;
    assert!(cached.cached);
    assert_eq!(cached.total_pendapatan, 50_000);
    assert_eq!(cached.rows, fresh.rows);

    let other_range = report_service::build_revenue_report(&state, today(), day).await;
    assert!(matches!(other_range, Err(AppError::DbError(_))));

    Ok(())
}
