use chrono::{Datelike, Duration, Months, NaiveDate};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::{
    db::DbPool,
    domain::status::BookingStatus,
    dto::dashboard::{CustomerDashboard, DailyRevenue, OwnerDashboard, StaffDashboard},
    entity::{
        booking::{Column as BookingCol, Entity as Bookings},
        stok::{Column as StokCol, Entity as Stok},
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_owner, ensure_staff},
    models::{Booking, Membership, StockItem},
    response::{ApiResponse, Meta},
    services::{
        customer_service::customer_for, membership_service::current_discount,
        stock_service::DEFAULT_LOW_STOCK_THRESHOLD, today,
    },
    state::AppState,
};

const UPCOMING_LIMIT: u64 = 10;
const LOW_STOCK_LIMIT: u64 = 10;

pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = day.with_day(1).unwrap_or(day);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(day);
    (first, last)
}

async fn revenue_between(pool: &DbPool, from: NaiveDate, to: NaiveDate) -> AppResult<i64> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(total_biaya), 0)::BIGINT
        FROM booking
        WHERE status = ANY($1) AND tanggal_booking BETWEEN $2 AND $3
        "#,
    )
    .bind(BookingStatus::strings(&BookingStatus::REVENUE))
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

async fn count_bookings(
    pool: &DbPool,
    date: Option<NaiveDate>,
    statuses: &[BookingStatus],
) -> AppResult<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM booking
        WHERE status = ANY($1) AND ($2::date IS NULL OR tanggal_booking = $2)
        "#,
    )
    .bind(BookingStatus::strings(statuses))
    .bind(date)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

async fn daily_revenue(pool: &DbPool, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<DailyRevenue>> {
    let rows = sqlx::query_as::<_, DailyRevenue>(
        r#"
        SELECT d::date AS tanggal,
               COALESCE(SUM(b.total_biaya), 0)::BIGINT AS total_pendapatan
        FROM generate_series($1::date, $2::date, INTERVAL '1 day') AS d
        LEFT JOIN booking b
               ON b.tanggal_booking = d::date AND b.status = ANY($3)
        GROUP BY d
        ORDER BY d
        "#,
    )
    .bind(from)
    .bind(to)
    .bind(BookingStatus::strings(&BookingStatus::REVENUE))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn owner_dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OwnerDashboard>> {
    ensure_owner(user)?;
    let today = today();
    let (month_start, month_end) = month_bounds(today);
    let pool = &state.pool;

    let active_memberships: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM membership WHERE status_keaktifan = 'active' AND expired_date >= $1",
    )
    .bind(today)
    .fetch_one(pool)
    .await?;
    let total_customers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pelanggan")
        .fetch_one(pool)
        .await?;
    let low_stock_items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stok WHERE jumlah <= $1")
        .bind(DEFAULT_LOW_STOCK_THRESHOLD)
        .fetch_one(pool)
        .await?;

    let data = OwnerDashboard {
        revenue_this_month: revenue_between(pool, month_start, month_end).await?,
        revenue_today: revenue_between(pool, today, today).await?,
        bookings_today: count_bookings(pool, Some(today), &BookingStatus::NOT_CANCELLED).await?,
        pending_bookings: count_bookings(pool, None, &[BookingStatus::Pending]).await?,
        active_memberships,
        total_customers,
        low_stock_items,
        revenue_last_7_days: daily_revenue(pool, today - Duration::days(6), today).await?,
    };

    Ok(ApiResponse::success("Owner dashboard", data, Some(Meta::empty())))
}

pub async fn staff_dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<StaffDashboard>> {
    ensure_staff(user)?;
    let today = today();

    let bookings_today = Bookings::find()
        .filter(BookingCol::TanggalBooking.eq(today))
        .order_by_asc(BookingCol::JamMulai)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Booking::from)
        .collect();

    let low_stock = Stok::find()
        .filter(StokCol::Jumlah.lte(DEFAULT_LOW_STOCK_THRESHOLD))
        .order_by_asc(StokCol::Jumlah)
        .limit(LOW_STOCK_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(StockItem::from)
        .collect();

    let data = StaffDashboard {
        today,
        bookings_today,
        pending_bookings: count_bookings(&state.pool, None, &[BookingStatus::Pending]).await?,
        low_stock,
    };
    Ok(ApiResponse::success("Staff dashboard", data, Some(Meta::empty())))
}

pub async fn customer_dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CustomerDashboard>> {
    let customer = customer_for(&state.orm, user).await?;
    let today = today();

    let upcoming_bookings = Bookings::find()
        .filter(BookingCol::PelangganId.eq(customer.pelanggan_id))
        .filter(BookingCol::TanggalBooking.gte(today))
        .filter(BookingCol::Status.is_in(BookingStatus::strings(&BookingStatus::OCCUPYING)))
        .order_by_asc(BookingCol::TanggalBooking)
        .order_by_asc(BookingCol::JamMulai)
        .limit(UPCOMING_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Booking::from)
        .collect();

    let (membership, discount) = current_discount(&state.orm, customer.pelanggan_id, today).await?;

    let data = CustomerDashboard {
        upcoming_bookings,
        active_membership: membership.map(Membership::from),
        discount,
    };
    Ok(ApiResponse::success("Customer dashboard", data, Some(Meta::empty())))
}
