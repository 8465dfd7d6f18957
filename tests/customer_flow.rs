mod common;

use sanguku_api::{
    db::DbPool,
    dto::{
        auth::{LoginRequest, PasswordResetConfirmRequest, PasswordResetRequest, RegisterRequest},
        stock::{AdjustStockRequest, CreateStockRequest},
    },
    error::AppError,
    middleware::auth::Role,
    routes::params::{LowStockQuery, SearchQuery},
    services::{auth_service, customer_service, stock_service},
    state::AppState,
};
use uuid::Uuid;

const CRM_FILE: &str = "sips_pelanggan_20250810_0930.csv";

// Integration flow: racing registrations -> CRM import (all-or-nothing) ->
// owner issues a single-use reset token
// so an imported customer can log in -> stock adjustments and low-stock list.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn customer_import_reset_and_stock_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;
    let owner = common::staff_user(Role::Owner);
    let staff = common::staff_user(Role::Staff);

    auth_service::register_customer(
        &state,
        RegisterRequest {
            username: "budi".into(),
            nama: "Budi Santoso".into(),
            password: "rahasia1".into(),
            email: None,
            no_telepon: None,
        },
    )
    .await?;
    create_staff_account(&state.pool, "kasir").await?;

    // Racing registrations of one username: one wins, the rest get 400.
    let mut handles = Vec::new();
    for _ in 0..4 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            auth_service::register_customer(
                &state,
                RegisterRequest {
                    username: "dewi".into(),
                    nama: "Dewi".into(),
                    password: "rahasia1".into(),
                    email: None,
                    no_telepon: None,
                },
            )
            .await
        }));
    }
    let mut registered = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => registered += 1,
            Err(AppError::BadRequest(_)) => {}
            Err(other) => panic!("unexpected registration error: {other:?}"),
        }
    }
    assert_eq!(registered, 1);

    // A bad row rejects the whole file.
    let broken = "username,nama,email,no_telepon\nrina,Rina,,\n,Tanpa Username,,\n";
    let rejected =
        customer_service::import_customers(&state, &staff, CRM_FILE, broken.as_bytes()).await;
    assert!(matches!(rejected, Err(AppError::BadRequest(_))));
    let listed = customer_service::list_customers(&state, &staff, SearchQuery::default())
        .await?
        .meta
        .unwrap();
    assert_eq!(listed.total, Some(2));

    // Usernames held by customers or staff are skipped, new ones inserted
    // without a password.
    let csv = "username,nama,email,no_telepon\n\
               budi,Budi Dari CRM,budi@crm.test,0811\n\
               rina,Rina Wati,rina@crm.test,0812\n\
               kasir,Bukan Kasir,,\n\
               tono,Tono,,\n";
    let imported = customer_service::import_customers(&state, &staff, CRM_FILE, csv.as_bytes())
        .await?
        .data
        .unwrap();
    assert_eq!(imported.inserted, 2);
    assert_eq!(imported.skipped, 2);

    let (filename, body) = customer_service::export_customers(&state, &staff).await?;
    assert!(filename.starts_with("sips_pelanggan_"));
    assert!(body.contains("rina,Rina Wati,rina@crm.test,0812"));
    assert!(!body.contains("Budi Dari CRM"));
    assert!(!body.contains("kasir"));

    // Imported customers cannot log in until a reset is confirmed.
    let login = LoginRequest {
        username: "rina".into(),
        password: "baru123".into(),
    };
    assert!(matches!(
        auth_service::login(&state, login_clone(&login)).await,
        Err(AppError::Unauthorized(_))
    ));
    let staff_reset = auth_service::create_reset_token(
        &state,
        &staff,
        PasswordResetRequest {
            username: "rina".into(),
        },
    )
    .await;
    assert!(matches!(staff_reset, Err(AppError::Forbidden)));

    let reset = auth_service::create_reset_token(
        &state,
        &owner,
        PasswordResetRequest {
            username: "rina".into(),
        },
    )
    .await?
    .data
    .unwrap();
    // Concurrent confirmations of one token: exactly one consumes it.
    let confirmed = confirm_concurrently(&state, &reset.token, 6).await?;
    assert_eq!(confirmed, 1);
    let reused = auth_service::confirm_reset(
        &state,
        PasswordResetConfirmRequest {
            token: reset.token,
            new_password: "lain123".into(),
        },
    )
    .await;
    assert!(matches!(reused, Err(AppError::BadRequest(_))));

    let session = auth_service::login(&state, login).await?.data.unwrap();
    assert_eq!(session.role, Role::Customer);
    assert!(!session.token.is_empty());

    // Stock never goes negative; low stock lists items at or under the threshold.
    let shuttle = stock_service::create_stock(
        &state,
        &staff,
        CreateStockRequest {
            nama_barang: "Shuttlecock".into(),
            kategori: Some("perlengkapan".into()),
            jumlah: 10,
            harga: 85_000,
        },
    )
    .await?
    .data
    .unwrap();

    let after_sale = stock_service::adjust_stock(
        &state,
        &staff,
        shuttle.stok_id,
        AdjustStockRequest { delta: -7 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(after_sale.jumlah, 3);

    let oversold = stock_service::adjust_stock(
        &state,
        &staff,
        shuttle.stok_id,
        AdjustStockRequest { delta: -4 },
    )
    .await;
    assert!(matches!(oversold, Err(AppError::BadRequest(_))));

    let duplicate = stock_service::create_stock(
        &state,
        &staff,
        CreateStockRequest {
            nama_barang: "Shuttlecock".into(),
            kategori: None,
            jumlah: 1,
            harga: 1,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let low = stock_service::list_low_stock(&state, &staff, LowStockQuery::default())
        .await?
        .data
        .unwrap();
    assert!(low.items.iter().any(|s| s.stok_id == shuttle.stok_id));

    Ok(())
}

fn login_clone(login: &LoginRequest) -> LoginRequest {
    LoginRequest {
        username: login.username.clone(),
        password: login.password.clone(),
    }
}

async fn confirm_concurrently(state: &AppState, token: &str, attempts: usize) -> anyhow::Result<usize> {
    let mut handles = Vec::new();
    for _ in 0..attempts {
        let state = state.clone();
        let token = token.to_string();
        handles.push(tokio::spawn(async move {
            auth_service::confirm_reset(
                &state,
                PasswordResetConfirmRequest {
                    token,
                    new_password: "baru123".into(),
                },
            )
            .await
        }));
    }

    let mut confirmed = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => confirmed += 1,
            Err(AppError::BadRequest(_)) => {}
            Err(other) => panic!("unexpected reset error: {other:?}"),
        }
    }
    Ok(confirmed)
}

async fn create_staff_account(pool: &DbPool, username: &str) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO pengguna (pengguna_id, username, nama, password_hash, role_id)
        SELECT $1, $2, $3, 'dummy', role_id FROM role WHERE nama_role = 'staff'
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(format!("Staff {username}"))
    .execute(pool)
    .await?;
    Ok(())
}
