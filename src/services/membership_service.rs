use chrono::NaiveDate;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        ids,
        tier::{MembershipStatus, Tier, booking_price, discount_for},
    },
    dto::memberships::{
        CreateMembershipRequest, DiscountInfo, MembershipList, TierInfo,
        UpdateMembershipStatusRequest,
    },
    entity::{
        membership::{
            self, ActiveModel as MembershipActive, Column as MemberCol, Entity as Memberships,
        },
        pelanggan::Entity as Pelanggan,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::Membership,
    response::{ApiResponse, Meta},
    routes::params::MembershipListQuery,
    services::{customer_service::customer_for, today},
    state::AppState,
};

pub async fn active_membership<C: ConnectionTrait>(
    db: &C,
    pelanggan_id: Uuid,
) -> AppResult<Option<membership::Model>> {
    let found = Memberships::find()
        .filter(MemberCol::PelangganId.eq(pelanggan_id))
        .filter(MemberCol::StatusKeaktifan.eq(MembershipStatus::Active.as_str()))
        .order_by_desc(MemberCol::ExpiredDate)
        .one(db)
        .await?;
    Ok(found)
}

/// The customer's active membership and the discount it grants on `today`.
pub async fn current_discount<C: ConnectionTrait>(
    db: &C,
    pelanggan_id: Uuid,
    today: NaiveDate,
) -> AppResult<(Option<membership::Model>, i64)> {
    let Some(found) = active_membership(db, pelanggan_id).await? else {
        return Ok((None, 0));
    };
    let discount = match (
        found.tier_membership.parse::<Tier>(),
        found.status_keaktifan.parse::<MembershipStatus>(),
    ) {
        (Ok(tier), Ok(status)) => discount_for(tier, status, found.expired_date, today),
        _ => {
            tracing::warn!(membership_id = %found.membership_id, "membership row has unknown tier or status");
            0
        }
    };
    Ok((Some(found), discount))
}

pub fn tiers() -> ApiResponse<Vec<TierInfo>> {
    let items = Tier::ALL
        .iter()
        .map(|tier| TierInfo {
            tier: *tier,
            duration_months: tier.duration_months(),
            discount: tier.discount(),
        })
        .collect();
    ApiResponse::success("Membership tiers", items, None)
}

pub async fn my_discount(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<DiscountInfo>> {
    let customer = customer_for(&state.orm, user).await?;
    let (membership, discount) = current_discount(&state.orm, customer.pelanggan_id, today()).await?;
    let hourly_rate = state.config.court_hourly_rate;

    Ok(ApiResponse::success(
        "Discount",
        DiscountInfo {
            membership_id: membership.as_ref().map(|m| m.membership_id.clone()),
            tier: membership.and_then(|m| m.tier_membership.parse().ok()),
            discount,
            hourly_rate,
            price: booking_price(hourly_rate, discount),
        },
        None,
    ))
}

pub async fn list_memberships(
    state: &AppState,
    user: &AuthUser,
    query: MembershipListQuery,
) -> AppResult<ApiResponse<MembershipList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if user.is_customer() {
        let customer = customer_for(&state.orm, user).await?;
        condition = condition.add(MemberCol::PelangganId.eq(customer.pelanggan_id));
    }
    if let Some(status) = query.status {
        condition = condition.add(MemberCol::StatusKeaktifan.eq(status.as_str()));
    }
    if let Some(tier) = query.tier {
        condition = condition.add(MemberCol::TierMembership.eq(tier.as_str()));
    }

    let finder = Memberships::find()
        .filter(condition)
        .order_by_desc(MemberCol::TanggalDaftar);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Membership::from)
        .collect();

    Ok(ApiResponse::success(
        "Memberships",
        MembershipList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_membership(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<Membership>> {
    let found = Memberships::find_by_id(id.to_string())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if user.is_customer() {
        let customer = customer_for(&state.orm, user).await?;
        if found.pelanggan_id != customer.pelanggan_id {
            return Err(AppError::NotFound);
        }
    }
    Ok(ApiResponse::success(
        "Membership found",
        Membership::from(found),
        Some(Meta::empty()),
    ))
}

/// Locks the customer row so concurrent registrations for the same
/// customer serialize; the partial unique index backs this up.
async fn lock_customer<C: ConnectionTrait>(db: &C, pelanggan_id: Uuid) -> AppResult<()> {
    Pelanggan::find_by_id(pelanggan_id)
        .lock(LockType::Update)
        .one(db)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown pelanggan_id".into()))?;
    Ok(())
}

pub async fn create_membership(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMembershipRequest,
) -> AppResult<ApiResponse<Membership>> {
    let pelanggan_id = if user.is_customer() {
        customer_for(&state.orm, user).await?.pelanggan_id
    } else {
        ensure_staff(user)?;
        payload
            .pelanggan_id
            .ok_or_else(|| AppError::BadRequest("pelanggan_id is required".into()))?
    };

    let tanggal_daftar = payload.tanggal_daftar.unwrap_or_else(today);
    let expired_date = payload
        .tier
        .expiry_for(tanggal_daftar)
        .ok_or_else(|| AppError::BadRequest("tanggal_daftar out of range".into()))?;
    if expired_date < today() {
        return Err(AppError::BadRequest("Membership would already be expired".into()));
    }

    let txn = state.orm.begin().await?;
    lock_customer(&txn, pelanggan_id).await?;
    if let Some(existing) = active_membership(&txn, pelanggan_id).await? {
        if existing.expired_date >= today() {
            return Err(AppError::Conflict(
                "Customer already has an active membership".into(),
            ));
        }
        // Lapsed but not yet swept; retire it so the new one can be active.
        let mut lapsed: MembershipActive = existing.into();
        lapsed.status_keaktifan = Set(MembershipStatus::Expired.as_str().to_string());
        lapsed.update(&txn).await?;
    }

    let created = MembershipActive {
        membership_id: Set(ids::membership_id(tanggal_daftar)),
        pelanggan_id: Set(pelanggan_id),
        tier_membership: Set(payload.tier.as_str().to_string()),
        tanggal_daftar: Set(tanggal_daftar),
        expired_date: Set(expired_date),
        status_keaktifan: Set(MembershipStatus::Active.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(
        membership_id = %created.membership_id,
        tier = %created.tier_membership,
        expired_date = %created.expired_date,
        "membership created"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "membership_create",
        "membership",
        serde_json::json!({ "membership_id": created.membership_id, "tier": created.tier_membership }),
    )
    .await;

    Ok(ApiResponse::success(
        "Membership created",
        Membership::from(created),
        Some(Meta::empty()),
    ))
}

pub async fn update_membership_status(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: UpdateMembershipStatusRequest,
) -> AppResult<ApiResponse<Membership>> {
    ensure_staff(user)?;

    let txn = state.orm.begin().await?;
    let found = Memberships::find_by_id(id.to_string())
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if payload.status == MembershipStatus::Active {
        if found.expired_date < today() {
            return Err(AppError::BadRequest(
                "Cannot activate a membership past its expiry date".into(),
            ));
        }
        lock_customer(&txn, found.pelanggan_id).await?;
        if let Some(other) = active_membership(&txn, found.pelanggan_id).await? {
            if other.membership_id != found.membership_id {
                return Err(AppError::Conflict(
                    "Customer already has an active membership".into(),
                ));
            }
        }
    }

    let mut active: MembershipActive = found.into();
    active.status_keaktifan = Set(payload.status.as_str().to_string());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "membership_status_update",
        "membership",
        serde_json::json!({ "membership_id": updated.membership_id, "status": updated.status_keaktifan }),
    )
    .await;

    Ok(ApiResponse::success(
        "Membership updated",
        Membership::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_membership(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let result = Memberships::delete_by_id(id.to_string())
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    audit::record(
        &state.pool,
        user.user_id,
        "membership_delete",
        "membership",
        serde_json::json!({ "membership_id": id }),
    )
    .await;
    Ok(ApiResponse::success(
        "Membership deleted",
        serde_json::json!({ "membership_id": id }),
        None,
    ))
}

/// Marks active memberships past their expiry date as expired.
pub async fn expire_memberships<C: ConnectionTrait>(db: &C, today: NaiveDate) -> AppResult<u64> {
    let result = Memberships::update_many()
        .col_expr(
            MemberCol::StatusKeaktifan,
            sea_orm::sea_query::Expr::value(MembershipStatus::Expired.as_str()),
        )
        .filter(MemberCol::StatusKeaktifan.eq(MembershipStatus::Active.as_str()))
        .filter(MemberCol::ExpiredDate.lt(today))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
