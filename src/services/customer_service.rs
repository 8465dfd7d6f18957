use std::collections::HashSet;

use chrono::Local;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, OnConflict, extension::postgres::PgExpr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::crm_csv::{self, CustomerRecord},
    dto::customers::{CustomerList, ImportResult},
    entity::{
        pelanggan::{self, ActiveModel as PelangganActive, Column as PelCol, Entity as Pelanggan},
        pengguna::{Column as PenggunaCol, Entity as Pengguna},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::Customer,
    response::{ApiResponse, Meta},
    routes::params::SearchQuery,
    state::AppState,
};

const INSERT_CHUNK: usize = 1000;

/// Resolves the customer row behind a customer token by username.
pub async fn customer_for<C: ConnectionTrait>(db: &C, user: &AuthUser) -> AppResult<pelanggan::Model> {
    if !user.is_customer() {
        return Err(AppError::Forbidden);
    }
    Pelanggan::find()
        .filter(PelCol::Username.eq(user.username.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Customer account no longer exists".into()))
}

pub async fn list_customers(
    state: &AppState,
    user: &AuthUser,
    query: SearchQuery,
) -> AppResult<ApiResponse<CustomerList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Pelanggan::find();
    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{q}%");
        finder = finder.filter(
            Condition::any()
                .add(Expr::col(PelCol::Nama).ilike(pattern.clone()))
                .add(Expr::col(PelCol::Username).ilike(pattern)),
        );
    }
    let finder = finder.order_by_asc(PelCol::Nama);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Customer::from)
        .collect();

    Ok(ApiResponse::success(
        "Customers",
        CustomerList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Customer>> {
    ensure_staff(user)?;
    let customer = Pelanggan::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Customer found",
        Customer::from(customer),
        Some(Meta::empty()),
    ))
}

/// All-or-nothing import of a CRM customer file. Usernames already held by a
/// customer or a staff account are left untouched and reported as skipped.
pub async fn import_customers(
    state: &AppState,
    user: &AuthUser,
    filename: &str,
    data: &[u8],
) -> AppResult<ApiResponse<ImportResult>> {
    ensure_staff(user)?;
    let exported_at =
        crm_csv::parse_filename(filename).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let records =
        crm_csv::parse_customers(data).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let total = records.len() as u64;

    let txn = state.orm.begin().await?;
    let staff_names: HashSet<String> = Pengguna::find()
        .select_only()
        .column(PenggunaCol::Username)
        .into_tuple::<String>()
        .all(&txn)
        .await?
        .into_iter()
        .collect();
    let records: Vec<CustomerRecord> = records
        .into_iter()
        .filter(|r| !staff_names.contains(&r.username))
        .collect();

    let mut inserted = 0u64;
    for chunk in records.chunks(INSERT_CHUNK) {
        let models = chunk.iter().map(|r| PelangganActive {
            pelanggan_id: Set(Uuid::new_v4()),
            username: Set(r.username.clone()),
            nama: Set(r.nama.clone()),
            email: Set(r.email.clone()),
            no_telepon: Set(r.no_telepon.clone()),
            password_hash: Set(None),
            created_at: NotSet,
        });
        inserted += Pelanggan::insert_many(models)
            .on_conflict(OnConflict::column(PelCol::Username).do_nothing().to_owned())
            .exec_without_returning(&txn)
            .await?;
    }
    txn.commit().await?;

    let skipped = total - inserted;
    tracing::info!(filename, inserted, skipped, "customer csv imported");
    audit::record(
        &state.pool,
        user.user_id,
        "customer_import",
        "pelanggan",
        serde_json::json!({ "filename": filename, "inserted": inserted, "skipped": skipped }),
    )
    .await;

    Ok(ApiResponse::success(
        "Customers imported",
        ImportResult {
            filename: filename.to_string(),
            exported_at,
            inserted,
            skipped,
        },
        None,
    ))
}

/// Returns `(filename, csv body)` in the same layout the import accepts.
pub async fn export_customers(state: &AppState, user: &AuthUser) -> AppResult<(String, String)> {
    ensure_staff(user)?;
    let records: Vec<CustomerRecord> = Pelanggan::find()
        .order_by_asc(PelCol::Username)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|c| CustomerRecord {
            username: c.username,
            nama: c.nama,
            email: c.email,
            no_telepon: c.no_telepon,
        })
        .collect();

    let body = crm_csv::render_customers(&records)?;
    let filename = crm_csv::export_filename(Local::now().naive_local());
    tracing::info!(rows = records.len(), %filename, "customer csv exported");
    Ok((filename, body))
}
