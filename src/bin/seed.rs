use chrono::Duration;
use sanguku_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    domain::{ids, tier::Tier},
    services::{auth_service::hash_password, today},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let owner_id = ensure_staff_account(&pool, "owner", "Pemilik Lapangan", "owner123", "owner").await?;
    let staff_id = ensure_staff_account(&pool, "staff", "Petugas Kasir", "staff123", "staff").await?;
    let customer_id = ensure_customer(&pool, "budi", "Budi Santoso", "budi123").await?;
    ensure_membership(&pool, customer_id, Tier::Gold).await?;
    seed_stock(&pool).await?;

    println!("Seed completed. Owner ID: {owner_id}, Staff ID: {staff_id}, Customer ID: {customer_id}");
    Ok(())
}

async fn ensure_staff_account(
    pool: &sqlx::PgPool,
    username: &str,
    nama: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO pengguna (pengguna_id, username, nama, password_hash, role_id)
        SELECT $1, $2, $3, $4, role_id FROM role WHERE nama_role = $5
        ON CONFLICT (username) DO UPDATE SET role_id = EXCLUDED.role_id
        RETURNING pengguna_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(nama)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured account {username} (role={role})");
    Ok(id)
}

async fn ensure_customer(
    pool: &sqlx::PgPool,
    username: &str,
    nama: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO pelanggan (pelanggan_id, username, nama, email, no_telepon, password_hash)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (username) DO NOTHING
        RETURNING pelanggan_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(nama)
    .bind(format!("{username}@example.com"))
    .bind("081200000000")
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    // If the customer already exists, fetch id
    let id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) =
                sqlx::query_as("SELECT pelanggan_id FROM pelanggan WHERE username = $1")
                    .bind(username)
                    .fetch_one(pool)
                    .await?;
            existing.0
        }
    };

    println!("Ensured customer {username}");
    Ok(id)
}

async fn ensure_membership(pool: &sqlx::PgPool, pelanggan_id: Uuid, tier: Tier) -> anyhow::Result<()> {
    let daftar = today();
    let expired = tier
        .expiry_for(daftar)
        .unwrap_or(daftar + Duration::days(30));

    let result = sqlx::query(
        r#"
        INSERT INTO membership
            (membership_id, pelanggan_id, tier_membership, tanggal_daftar, expired_date, status_keaktifan)
        VALUES ($1, $2, $3, $4, $5, 'active')
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(ids::membership_id(daftar))
    .bind(pelanggan_id)
    .bind(tier.as_str())
    .bind(daftar)
    .bind(expired)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        println!("Seeded {} membership", tier.as_str());
    }
    Ok(())
}

async fn seed_stock(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let items = vec![
        ("Shuttlecock Tube", "perlengkapan", 40, 85000_i64),
        ("Grip Raket", "perlengkapan", 25, 15000),
        ("Air Mineral 600ml", "minuman", 120, 5000),
        ("Minuman Isotonik", "minuman", 3, 8000),
        ("Sewa Raket", "sewa", 10, 20000),
    ];

    for (nama, kategori, jumlah, harga) in items {
        sqlx::query(
            r#"
            INSERT INTO stok (stok_id, nama_barang, kategori, jumlah, harga)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (nama_barang) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(nama)
        .bind(kategori)
        .bind(jumlah)
        .bind(harga)
        .execute(pool)
        .await?;
    }

    println!("Seeded stock");
    Ok(())
}
