pub mod auth;
pub mod bookings;
pub mod customers;
pub mod dashboard;
pub mod memberships;
pub mod reports;
pub mod stock;
