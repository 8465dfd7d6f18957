use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::tier::{MembershipStatus, Tier},
    models::Membership,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMembershipRequest {
    /// Required for staff/owner; customers always register themselves.
    pub pelanggan_id: Option<Uuid>,
    pub tier: Tier,
    /// Defaults to today.
    pub tanggal_daftar: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMembershipStatusRequest {
    pub status: MembershipStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MembershipList {
    pub items: Vec<Membership>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TierInfo {
    pub tier: Tier,
    pub duration_months: u32,
    pub discount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiscountInfo {
    pub membership_id: Option<String>,
    pub tier: Option<Tier>,
    pub discount: i64,
    pub hourly_rate: i64,
    pub price: i64,
}
