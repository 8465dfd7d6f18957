mod common;

use chrono::{Duration, NaiveTime};
use sanguku_api::{
    domain::{
        status::BookingStatus,
        tier::{MembershipStatus, Tier},
    },
    dto::{
        bookings::{CreateBookingRequest, UpdateBookingStatusRequest},
        memberships::{CreateMembershipRequest, UpdateMembershipStatusRequest},
    },
    error::AppError,
    middleware::auth::{AuthUser, Role},
    models::Booking,
    routes::params::{BookingListQuery, MembershipListQuery},
    services::{booking_service, dashboard_service, membership_service, today},
    state::AppState,
};
use uuid::Uuid;

fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

async fn book(
    state: &AppState,
    staff: &AuthUser,
    pelanggan_id: Uuid,
    day: chrono::NaiveDate,
    hour: u32,
) -> anyhow::Result<Booking> {
    let booking = booking_service::create_booking(
        state,
        staff,
        CreateBookingRequest {
            pelanggan_id: Some(pelanggan_id),
            tanggal_booking: day,
            jam_mulai: at(hour),
            status: Some(BookingStatus::Confirmed),
            total_biaya: None,
            metode_pembayaran: None,
        },
    )
    .await?
    .data
    .unwrap();
    Ok(booking)
}

// Customers only ever see their own rows; staff see everything and the
// dashboards aggregate per role.
#[tokio::test]
async fn role_visibility_and_dashboards() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;
    let budi = common::create_customer(&state, "budi").await?;
    let sari = common::create_customer(&state, "sari").await?;
    let staff = common::staff_user(Role::Staff);
    let owner = common::staff_user(Role::Owner);
    let later = today() + Duration::days(2);

    let budi_booking = book(&state, &staff, budi.user_id, later, 8).await?;
    let sari_booking = book(&state, &staff, sari.user_id, later, 9).await?;

    let own = booking_service::list_bookings(&state, &budi, BookingListQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(own.items.len(), 1);
    assert!(own.items.iter().all(|b| b.pelanggan_id == budi.user_id));

    let all = booking_service::list_bookings(&state, &staff, BookingListQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(all.items.len(), 2);

    let foreign = booking_service::get_booking(&state, &budi, &sari_booking.booking_id).await;
    assert!(matches!(foreign, Err(AppError::NotFound)));
    let mine = booking_service::get_booking(&state, &budi, &budi_booking.booking_id)
        .await?
        .data
        .unwrap();
    assert_eq!(mine.booking_id, budi_booking.booking_id);

    let missing = booking_service::delete_booking(&state, &staff, "BK-19700101-00000000").await;
    assert!(matches!(missing, Err(AppError::NotFound)));
    let by_customer = booking_service::delete_booking(&state, &budi, &budi_booking.booking_id).await;
    assert!(matches!(by_customer, Err(AppError::Forbidden)));

    // A second active membership cannot be switched on through a status update.
    let first = membership_service::create_membership(
        &state,
        &staff,
        CreateMembershipRequest {
            pelanggan_id: Some(budi.user_id),
            tier: Tier::Silver,
            tanggal_daftar: None,
        },
    )
    .await?
    .data
    .unwrap();
    membership_service::update_membership_status(
        &state,
        &staff,
        &first.membership_id,
        UpdateMembershipStatusRequest {
            status: MembershipStatus::Inactive,
        },
    )
    .await?;
    let second = membership_service::create_membership(
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
    let reactivate = membership_service::update_membership_status(
        &state,
        &staff,
        &first.membership_id,
        UpdateMembershipStatusRequest {
            status: MembershipStatus::Active,
        },
    )
    .await;
    assert!(matches!(reactivate, Err(AppError::Conflict(_))));

    let sari_memberships =
        membership_service::list_memberships(&state, &sari, MembershipListQuery::default())
            .await?
            .data
            .unwrap();
    assert!(sari_memberships.items.is_empty());
    let budi_memberships =
        membership_service::list_memberships(&state, &budi, MembershipListQuery::default())
            .await?
            .data
            .unwrap();
    assert_eq!(budi_memberships.items.len(), 2);

    // A booking finished today still counts toward today's total.
    let today_booking = book(&state, &staff, sari.user_id, today(), 8).await?;
    booking_service::update_status(
        &state,
        &staff,
        &today_booking.booking_id,
        UpdateBookingStatusRequest {
            status: BookingStatus::Completed,
            metode_pembayaran: Some("cash".into()),
        },
    )
    .await?;

    let owner_view = dashboard_service::owner_dashboard(&state, &owner)
        .await?
        .data
        .unwrap();
    assert_eq!(owner_view.bookings_today, 1);
    assert_eq!(owner_view.total_customers, 2);
    assert_eq!(owner_view.revenue_last_7_days.len(), 7);
    assert!(matches!(
        dashboard_service::owner_dashboard(&state, &staff).await,
        Err(AppError::Forbidden)
    ));

    let staff_view = dashboard_service::staff_dashboard(&state, &staff)
        .await?
        .data
        .unwrap();
    assert!(
        staff_view
            .bookings_today
            .iter()
            .any(|b| b.booking_id == today_booking.booking_id)
    );

    let budi_view = dashboard_service::customer_dashboard(&state, &budi)
        .await?
        .data
        .unwrap();
    assert_eq!(budi_view.upcoming_bookings.len(), 1);
    assert_eq!(
        budi_view.active_membership.map(|m| m.membership_id),
        Some(second.membership_id)
    );
    assert_eq!(budi_view.discount, 15_000);

    Ok(())
}
