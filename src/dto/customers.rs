use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Customer;

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerList {
    pub items: Vec<Customer>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResult {
    pub filename: String,
    /// Timestamp encoded in the CRM filename.
    pub exported_at: NaiveDateTime,
    pub inserted: u64,
    /// Rows whose username already existed.
    pub skipped: u64,
}
