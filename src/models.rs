use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{booking, membership, pelanggan, stok};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub booking_id: String,
    pub pelanggan_id: Uuid,
    pub tanggal_booking: NaiveDate,
    #[schema(value_type = String, example = "19:00:00")]
    pub jam_mulai: NaiveTime,
    #[schema(value_type = String, example = "20:00:00")]
    pub jam_selesai: NaiveTime,
    pub status: String,
    pub total_biaya: i64,
    pub metode_pembayaran: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<booking::Model> for Booking {
    fn from(model: booking::Model) -> Self {
        Self {
            booking_id: model.booking_id,
            pelanggan_id: model.pelanggan_id,
            tanggal_booking: model.tanggal_booking,
            jam_mulai: model.jam_mulai,
            jam_selesai: model.jam_selesai,
            status: model.status,
            total_biaya: model.total_biaya,
            metode_pembayaran: model.metode_pembayaran,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Membership {
    pub membership_id: String,
    pub pelanggan_id: Uuid,
    pub tier_membership: String,
    pub tanggal_daftar: NaiveDate,
    pub expired_date: NaiveDate,
    pub status_keaktifan: String,
    pub created_at: DateTime<Utc>,
}

impl From<membership::Model> for Membership {
    fn from(model: membership::Model) -> Self {
        Self {
            membership_id: model.membership_id,
            pelanggan_id: model.pelanggan_id,
            tier_membership: model.tier_membership,
            tanggal_daftar: model.tanggal_daftar,
            expired_date: model.expired_date,
            status_keaktifan: model.status_keaktifan,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub pelanggan_id: Uuid,
    pub username: String,
    pub nama: String,
    pub email: Option<String>,
    pub no_telepon: Option<String>,
    pub has_login: bool,
    pub created_at: DateTime<Utc>,
}

impl From<pelanggan::Model> for Customer {
    fn from(model: pelanggan::Model) -> Self {
        Self {
            pelanggan_id: model.pelanggan_id,
            username: model.username,
            nama: model.nama,
            email: model.email,
            no_telepon: model.no_telepon,
            has_login: model.password_hash.is_some(),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockItem {
    pub stok_id: Uuid,
    pub nama_barang: String,
    pub kategori: Option<String>,
    pub jumlah: i32,
    pub harga: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<stok::Model> for StockItem {
    fn from(model: stok::Model) -> Self {
        Self {
            stok_id: model.stok_id,
            nama_barang: model.nama_barang,
            kategori: model.kategori,
            jumlah: model.jumlah,
            harga: model.harga,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
