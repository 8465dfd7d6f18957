use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::stock::{AdjustStockRequest, CreateStockRequest, StockList, UpdateStockRequest},
    entity::stok::{ActiveModel as StokActive, Column as StokCol, Entity as Stok},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::StockItem,
    response::{ApiResponse, Meta},
    routes::params::{LowStockQuery, SearchQuery},
    state::AppState,
};

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

fn validate_amounts(jumlah: Option<i32>, harga: Option<i64>) -> AppResult<()> {
    if jumlah.is_some_and(|j| j < 0) {
        return Err(AppError::BadRequest("jumlah must not be negative".into()));
    }
    if harga.is_some_and(|h| h < 0) {
        return Err(AppError::BadRequest("harga must not be negative".into()));
    }
    Ok(())
}

pub async fn list_stock(
    state: &AppState,
    user: &AuthUser,
    query: SearchQuery,
) -> AppResult<ApiResponse<StockList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(search) = query.q.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        condition = condition.add(
            Condition::any()
                .add(Expr::col(StokCol::NamaBarang).ilike(pattern.clone()))
                .add(Expr::col(StokCol::Kategori).ilike(pattern)),
        );
    }

    let finder = Stok::find()
        .filter(condition)
        .order_by_asc(StokCol::NamaBarang);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(StockItem::from)
        .collect();

    Ok(ApiResponse::success(
        "Stock",
        StockList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_stock(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<StockItem>> {
    ensure_staff(user)?;
    let item = Stok::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Stock item", StockItem::from(item), None))
}

pub async fn create_stock(
    state: &AppState,
    user: &AuthUser,
    payload: CreateStockRequest,
) -> AppResult<ApiResponse<StockItem>> {
    ensure_staff(user)?;
    if payload.nama_barang.trim().is_empty() {
        return Err(AppError::BadRequest("nama_barang is required".into()));
    }
    validate_amounts(Some(payload.jumlah), Some(payload.harga))?;

    let item = StokActive {
        stok_id: Set(Uuid::new_v4()),
        nama_barang: Set(payload.nama_barang.trim().to_string()),
        kategori: Set(payload.kategori),
        jumlah: Set(payload.jumlah),
        harga: Set(payload.harga),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "stock_create",
        "stok",
        serde_json::json!({ "stok_id": item.stok_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Stock item created",
        StockItem::from(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_stock(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateStockRequest,
) -> AppResult<ApiResponse<StockItem>> {
    ensure_staff(user)?;
    validate_amounts(payload.jumlah, payload.harga)?;

    let existing = Stok::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: StokActive = existing.into();
    if let Some(name) = payload.nama_barang.filter(|n| !n.trim().is_empty()) {
        active.nama_barang = Set(name.trim().to_string());
    }
    if let Some(kategori) = payload.kategori {
        active.kategori = Set(Some(kategori));
    }
    if let Some(jumlah) = payload.jumlah {
        active.jumlah = Set(jumlah);
    }
    if let Some(harga) = payload.harga {
        active.harga = Set(harga);
    }
    active.updated_at = Set(Utc::now().into());
    let item = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "stock_update",
        "stok",
        serde_json::json!({ "stok_id": item.stok_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Stock item updated",
        StockItem::from(item),
        Some(Meta::empty()),
    ))
}

pub async fn delete_stock(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let result = Stok::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "stock_delete",
        "stok",
        serde_json::json!({ "stok_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Stock item deleted",
        serde_json::json!({ "stok_id": id }),
        None,
    ))
}

pub async fn adjust_stock(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AdjustStockRequest,
) -> AppResult<ApiResponse<StockItem>> {
    ensure_staff(user)?;
    if payload.delta == 0 {
        return Err(AppError::BadRequest("delta must not be 0".into()));
    }

    let txn = state.orm.begin().await?;
    let item = Stok::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let new_jumlah = item
        .jumlah
        .checked_add(payload.delta)
        .filter(|j| *j >= 0)
        .ok_or_else(|| AppError::BadRequest("stock cannot be negative".into()))?;

    let mut active: StokActive = item.into();
    active.jumlah = Set(new_jumlah);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "stock_adjust",
        "stok",
        serde_json::json!({ "stok_id": updated.stok_id, "delta": payload.delta }),
    )
    .await;

    Ok(ApiResponse::success(
        "Stock adjusted",
        StockItem::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<StockList>> {
    ensure_staff(user)?;
    let threshold = query.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    let (page, limit, offset) = query.pagination().normalize();

    let finder = Stok::find()
        .filter(StokCol::Jumlah.lte(threshold))
        .order_by_asc(StokCol::Jumlah)
        .order_by_asc(StokCol::NamaBarang);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(StockItem::from)
        .collect();

    Ok(ApiResponse::success(
        "Low stock",
        StockList { items },
        Some(Meta::new(page, limit, total)),
    ))
}
