use chrono::{Local, NaiveDate};

pub mod auth_service;
pub mod booking_service;
pub mod customer_service;
pub mod dashboard_service;
pub mod membership_service;
pub mod report_service;
pub mod stock_service;

/// Calendar day at the facility (server local time).
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
