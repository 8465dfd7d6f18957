use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::StockItem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStockRequest {
    pub nama_barang: String,
    pub kategori: Option<String>,
    pub jumlah: i32,
    pub harga: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStockRequest {
    pub nama_barang: Option<String>,
    pub kategori: Option<String>,
    pub jumlah: Option<i32>,
    pub harga: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustStockRequest {
    pub delta: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockList {
    pub items: Vec<StockItem>,
}
