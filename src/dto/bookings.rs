use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{domain::status::BookingStatus, models::Booking};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    /// Required for staff/owner entries; ignored for customers.
    pub pelanggan_id: Option<Uuid>,
    pub tanggal_booking: NaiveDate,
    #[schema(value_type = String, example = "19:00:00")]
    pub jam_mulai: NaiveTime,
    /// Staff/owner only; customers always get `confirmed`.
    pub status: Option<BookingStatus>,
    /// Staff/owner price override.
    pub total_biaya: Option<i64>,
    pub metode_pembayaran: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
    pub metode_pembayaran: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingList {
    pub items: Vec<Booking>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SlotAvailability {
    #[schema(value_type = String, example = "08:00:00")]
    pub jam_mulai: NaiveTime,
    #[schema(value_type = String, example = "09:00:00")]
    pub jam_selesai: NaiveTime,
    pub available: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Availability {
    pub tanggal: NaiveDate,
    pub available_count: usize,
    pub slots: Vec<SlotAvailability>,
}
