use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Booking, Membership, StockItem};

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct DailyRevenue {
    pub tanggal: NaiveDate,
    pub total_pendapatan: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OwnerDashboard {
    pub revenue_this_month: i64,
    pub revenue_today: i64,
    /// Today's bookings in any status except cancelled.
    pub bookings_today: i64,
    pub pending_bookings: i64,
    pub active_memberships: i64,
    pub total_customers: i64,
    pub low_stock_items: i64,
    /// Last seven days including today, oldest first; days without revenue are 0.
    pub revenue_last_7_days: Vec<DailyRevenue>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffDashboard {
    pub today: NaiveDate,
    pub bookings_today: Vec<Booking>,
    pub pending_bookings: i64,
    pub low_stock: Vec<StockItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerDashboard {
    pub upcoming_bookings: Vec<Booking>,
    pub active_membership: Option<Membership>,
    pub discount: i64,
}
