//! Business rules that need no database: the court slot grid, status
//! transitions, membership tiers and the CRM CSV format.

pub mod crm_csv;
pub mod ids;
pub mod slots;
pub mod status;
pub mod tier;
