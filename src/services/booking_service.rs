use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};

use crate::{
    audit,
    domain::{ids, slots, status::BookingStatus, tier::booking_price},
    dto::bookings::{
        Availability, BookingList, CreateBookingRequest, SlotAvailability,
        UpdateBookingStatusRequest,
    },
    entity::{
        booking::{ActiveModel as BookingActive, Column as BookingCol, Entity as Bookings},
        pelanggan::Entity as Pelanggan,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::Booking,
    response::{ApiResponse, Meta},
    routes::params::{BookingListQuery, SortOrder},
    services::{customer_service::customer_for, membership_service::current_discount, today},
    state::AppState,
};

/// Start times already held on `date` by pending/confirmed/paid bookings.
pub async fn booked_starts<C: ConnectionTrait>(db: &C, date: NaiveDate) -> AppResult<Vec<NaiveTime>> {
    let rows = Bookings::find()
        .filter(BookingCol::TanggalBooking.eq(date))
        .filter(BookingCol::Status.is_in(BookingStatus::strings(&BookingStatus::OCCUPYING)))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|b| b.jam_mulai).collect())
}

pub async fn availability(state: &AppState, date: NaiveDate) -> AppResult<ApiResponse<Availability>> {
    let booked = booked_starts(&state.orm, date).await?;
    let slots: Vec<SlotAvailability> = slots::all_slots()
        .into_iter()
        .map(|slot| SlotAvailability {
            jam_mulai: slot.jam_mulai,
            jam_selesai: slot.jam_selesai,
            available: !booked.contains(&slot.jam_mulai),
        })
        .collect();
    let available_count = slots.iter().filter(|s| s.available).count();

    Ok(ApiResponse::success(
        "Availability",
        Availability {
            tanggal: date,
            available_count,
            slots,
        },
        Some(Meta::empty()),
    ))
}

/// Serializes reservations for one day. Released at commit or rollback.
async fn lock_booking_day<C: ConnectionTrait>(db: &C, date: NaiveDate) -> AppResult<()> {
    let key = i64::from(date.num_days_from_ce());
    db.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock($1)",
        [key.into()],
    ))
    .await?;
    Ok(())
}

pub async fn create_booking(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBookingRequest,
) -> AppResult<ApiResponse<Booking>> {
    let slot = slots::slot_for_start(payload.jam_mulai).ok_or_else(|| {
        AppError::BadRequest("jam_mulai must be one of the bookable slot start times".into())
    })?;
    let today = today();
    if payload.tanggal_booking < today {
        return Err(AppError::BadRequest("Cannot book a date in the past".into()));
    }

    let (pelanggan_id, status, price_override) = if user.is_customer() {
        let customer = customer_for(&state.orm, user).await?;
        (customer.pelanggan_id, BookingStatus::Confirmed, None)
    } else {
        ensure_staff(user)?;
        let pelanggan_id = payload
            .pelanggan_id
            .ok_or_else(|| AppError::BadRequest("pelanggan_id is required".into()))?;
        Pelanggan::find_by_id(pelanggan_id)
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::BadRequest("Unknown pelanggan_id".into()))?;
        let status = payload.status.unwrap_or(BookingStatus::Pending);
        if !status.occupies_slot() {
            return Err(AppError::BadRequest(
                "New bookings must be pending, confirmed or paid".into(),
            ));
        }
        if payload.total_biaya.is_some_and(|v| v < 0) {
            return Err(AppError::BadRequest("total_biaya must not be negative".into()));
        }
        (pelanggan_id, status, payload.total_biaya)
    };

    let txn = state.orm.begin().await?;
    lock_booking_day(&txn, payload.tanggal_booking).await?;

    if booked_starts(&txn, payload.tanggal_booking)
        .await?
        .contains(&slot.jam_mulai)
    {
        return Err(AppError::Conflict("Slot is already booked".into()));
    }

    let total_biaya = match price_override {
        Some(value) => value,
        None => {
            let (_, discount) = current_discount(&txn, pelanggan_id, today).await?;
            booking_price(state.config.court_hourly_rate, discount)
        }
    };

    let booking = BookingActive {
        booking_id: Set(ids::booking_id(payload.tanggal_booking)),
        pelanggan_id: Set(pelanggan_id),
        tanggal_booking: Set(payload.tanggal_booking),
        jam_mulai: Set(slot.jam_mulai),
        jam_selesai: Set(slot.jam_selesai),
        status: Set(status.as_str().to_string()),
        total_biaya: Set(total_biaya),
        metode_pembayaran: Set(payload.metode_pembayaran.filter(|m| !m.trim().is_empty())),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|err| match AppError::from(err) {
        AppError::Conflict(_) => AppError::Conflict("Slot is already booked".into()),
        other => other,
    })?;

    txn.commit().await?;

    tracing::info!(
        booking_id = %booking.booking_id,
        tanggal = %booking.tanggal_booking,
        jam_mulai = %booking.jam_mulai,
        status = %booking.status,
        "booking created"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "booking_create",
        "booking",
        serde_json::json!({ "booking_id": booking.booking_id, "total_biaya": booking.total_biaya }),
    )
    .await;

    Ok(ApiResponse::success(
        "Booking created",
        Booking::from(booking),
        Some(Meta::empty()),
    ))
}

pub async fn list_bookings(
    state: &AppState,
    user: &AuthUser,
    query: BookingListQuery,
) -> AppResult<ApiResponse<BookingList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if user.is_customer() {
        let customer = customer_for(&state.orm, user).await?;
        condition = condition.add(BookingCol::PelangganId.eq(customer.pelanggan_id));
    }
    if let Some(date) = query.date {
        condition = condition.add(BookingCol::TanggalBooking.eq(date));
    }
    if let Some(status) = query.status {
        condition = condition.add(BookingCol::Status.eq(status.as_str()));
    }

    let mut finder = Bookings::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(BookingCol::TanggalBooking),
        SortOrder::Desc => finder.order_by_desc(BookingCol::TanggalBooking),
    };
    finder = finder.order_by_asc(BookingCol::JamMulai);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Booking::from)
        .collect();

    Ok(ApiResponse::success(
        "Bookings",
        BookingList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_booking(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<Booking>> {
    let booking = Bookings::find_by_id(id.to_string())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if user.is_customer() {
        let customer = customer_for(&state.orm, user).await?;
        if booking.pelanggan_id != customer.pelanggan_id {
            return Err(AppError::NotFound);
        }
    }

    Ok(ApiResponse::success(
        "Booking found",
        Booking::from(booking),
        Some(Meta::empty()),
    ))
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: UpdateBookingStatusRequest,
) -> AppResult<ApiResponse<Booking>> {
    let txn = state.orm.begin().await?;
    let booking = Bookings::find_by_id(id.to_string())
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if user.is_customer() {
        let customer = customer_for(&txn, user).await?;
        if booking.pelanggan_id != customer.pelanggan_id {
            return Err(AppError::NotFound);
        }
        if payload.status != BookingStatus::Cancelled {
            return Err(AppError::Forbidden);
        }
    } else {
        ensure_staff(user)?;
    }

    let current: BookingStatus = booking
        .status
        .parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))?;
    if user.is_customer() && !matches!(current, BookingStatus::Pending | BookingStatus::Confirmed) {
        return Err(AppError::BadRequest(
            "Only pending or confirmed bookings can be cancelled".into(),
        ));
    }
    if !current.can_transition_to(payload.status) {
        return Err(AppError::BadRequest(format!(
            "Cannot change booking status from {current} to {}",
            payload.status
        )));
    }

    let previous = booking.status.clone();
    let mut active: BookingActive = booking.into();
    active.status = Set(payload.status.as_str().to_string());
    if let Some(method) = payload.metode_pembayaran.filter(|m| !m.trim().is_empty()) {
        active.metode_pembayaran = Set(Some(method));
    }
    active.updated_at = Set(Utc::now().into());
    let booking = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        booking_id = %booking.booking_id,
        from = %previous,
        to = %booking.status,
        "booking status changed"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "booking_status_update",
        "booking",
        serde_json::json!({ "booking_id": booking.booking_id, "from": previous, "to": booking.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Booking updated",
        Booking::from(booking),
        Some(Meta::empty()),
    ))
}

pub async fn delete_booking(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let result = Bookings::delete_by_id(id.to_string())
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "booking_delete",
        "booking",
        serde_json::json!({ "booking_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Booking deleted",
        serde_json::json!({ "booking_id": id }),
        None,
    ))
}
