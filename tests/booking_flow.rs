mod common;

use chrono::{Duration, NaiveTime};
use sanguku_api::{
    domain::{status::BookingStatus, tier::Tier},
    dto::{
        bookings::{CreateBookingRequest, UpdateBookingStatusRequest},
        memberships::CreateMembershipRequest,
    },
    error::AppError,
    middleware::auth::Role,
    routes::params::DateRangeQuery,
    services::{booking_service, membership_service, report_service, today},
};

fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

// Integration flow: customer books -> slot conflict -> membership discount ->
// cancel frees the slot -> staff marks paid -> revenue report -> expiry sweep.
#[tokio::test]
async fn booking_membership_and_revenue_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;

    let budi = common::create_customer(&state, "budi").await?;
    let sari = common::create_customer(&state, "sari").await?;
    let staff = common::staff_user(Role::Staff);
    let day = today() + Duration::days(3);

    // Customer booking without a membership pays the full rate.
    let first = booking_service::create_booking(
        &state,
        &budi,
        CreateBookingRequest {
            pelanggan_id: None,
            tanggal_booking: day,
            jam_mulai: at(19),
            status: Some(BookingStatus::Paid),
            total_biaya: Some(1),
            metode_pembayaran: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(first.status, "confirmed");
    assert_eq!(first.total_biaya, common::COURT_RATE);
    assert_eq!(first.jam_selesai, at(20));
    assert!(first.booking_id.starts_with("BK-"));

    // Same slot for someone else is a conflict.
    let clash = booking_service::create_booking(
        &state,
        &staff,
        CreateBookingRequest {
            pelanggan_id: Some(sari.user_id),
            tanggal_booking: day,
            jam_mulai: at(19),
            status: None,
            total_biaya: None,
            metode_pembayaran: None,
        },
    )
    .await;
    assert!(matches!(clash, Err(AppError::Conflict(_))));

    let availability = booking_service::availability(&state, day).await?.data.unwrap();
    assert_eq!(availability.slots.len(), 13);
    assert_eq!(availability.available_count, 12);
    assert!(
        availability
            .slots
            .iter()
            .any(|s| s.jam_mulai == at(19) && !s.available)
    );

    // Gold membership: one active per customer, 15k off the next booking.
    let membership = membership_service::create_membership(
        &state,
        &staff,
        CreateMembershipRequest {
            pelanggan_id: Some(budi.user_id),
            tier: Tier::Gold,
            tanggal_daftar: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(membership.status_keaktifan, "active");
    assert_eq!(membership.tier_membership, "Gold");

    let second_membership = membership_service::create_membership(
        &state,
        &budi,
        CreateMembershipRequest {
            pelanggan_id: None,
            tier: Tier::Silver,
            tanggal_daftar: None,
        },
    )
    .await;
    assert!(matches!(second_membership, Err(AppError::Conflict(_))));

    let discounted = booking_service::create_booking(
        &state,
        &budi,
        CreateBookingRequest {
            pelanggan_id: None,
            tanggal_booking: day,
            jam_mulai: at(20),
            status: None,
            total_biaya: None,
            metode_pembayaran: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(discounted.total_biaya, common::COURT_RATE - 15_000);

    // Customers may only cancel, and cancelling frees the slot.
    let forbidden = booking_service::update_status(
        &state,
        &budi,
        &first.booking_id,
        UpdateBookingStatusRequest {
            status: BookingStatus::Paid,
            metode_pembayaran: None,
        },
    )
    .await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    let cancelled = booking_service::update_status(
        &state,
        &budi,
        &first.booking_id,
        UpdateBookingStatusRequest {
            status: BookingStatus::Cancelled,
            metode_pembayaran: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(cancelled.status, "cancelled");

    let availability = booking_service::availability(&state, day).await?.data.unwrap();
    assert!(
        availability
            .slots
            .iter()
            .any(|s| s.jam_mulai == at(19) && s.available)
    );

    // Cancelled is terminal.
    let reopen = booking_service::update_status(
        &state,
        &staff,
        &first.booking_id,
        UpdateBookingStatusRequest {
            status: BookingStatus::Confirmed,
            metode_pembayaran: None,
        },
    )
    .await;
    assert!(matches!(reopen, Err(AppError::BadRequest(_))));

    let paid = booking_service::update_status(
        &state,
        &staff,
        &discounted.booking_id,
        UpdateBookingStatusRequest {
            status: BookingStatus::Paid,
            metode_pembayaran: Some("cash".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(paid.status, "paid");
    assert_eq!(paid.metode_pembayaran.as_deref(), Some("cash"));

    // Only the paid booking counts toward revenue.
    let report = report_service::revenue_report(
        &state,
        &staff,
        DateRangeQuery {
            from: Some(day),
            to: Some(day),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(report.total_booking, 1);
    assert_eq!(report.total_pendapatan, common::COURT_RATE - 15_000);
    assert_eq!(report.rows[0].metode_pembayaran, "cash");
    assert!(!report.cached);

    let csv = report_service::revenue_report_csv(
        &state,
        &staff,
        DateRangeQuery {
            from: Some(day),
            to: Some(day),
        },
    )
    .await?;
    assert!(csv.1.contains("TOTAL"));

    // The sweep expires the membership once its end date has passed.
    let after_expiry = membership.expired_date + Duration::days(1);
    let expired = membership_service::expire_memberships(&state.orm, after_expiry).await?;
    assert_eq!(expired, 1);
    let (active, discount) =
        membership_service::current_discount(&state.orm, budi.user_id, after_expiry).await?;
    assert!(active.is_none());
    assert_eq!(discount, 0);

    Ok(())
}
