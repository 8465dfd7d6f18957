use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use utoipa::ToSchema;

/// Start hours of the bookable windows. 12:00 and 18:00 are the lunch and
/// dinner breaks; the last window ends at 23:00.
pub const SLOT_START_HOURS: [u32; 13] = [8, 9, 10, 11, 13, 14, 15, 16, 17, 19, 20, 21, 22];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TimeSlot {
    #[schema(value_type = String, example = "08:00:00")]
    pub jam_mulai: NaiveTime,
    #[schema(value_type = String, example = "09:00:00")]
    pub jam_selesai: NaiveTime,
}

impl TimeSlot {
    fn from_hour(hour: u32) -> Option<Self> {
        Some(Self {
            jam_mulai: NaiveTime::from_hms_opt(hour, 0, 0)?,
            jam_selesai: NaiveTime::from_hms_opt(hour + 1, 0, 0)?,
        })
    }
}

pub fn all_slots() -> Vec<TimeSlot> {
    SLOT_START_HOURS
        .iter()
        .filter_map(|&h| TimeSlot::from_hour(h))
        .collect()
}

/// Only exact slot starts are bookable: `10:30` or `12:00` yield `None`.
pub fn slot_for_start(start: NaiveTime) -> Option<TimeSlot> {
    if start.minute() != 0 || start.second() != 0 || start.nanosecond() != 0 {
        return None;
    }
    if !SLOT_START_HOURS.contains(&start.hour()) {
        return None;
    }
    TimeSlot::from_hour(start.hour())
}

/// Fixed grid minus every slot whose start appears in `booked_starts`.
pub fn available_slots(booked_starts: &[NaiveTime]) -> Vec<TimeSlot> {
    all_slots()
        .into_iter()
        .filter(|slot| !booked_starts.contains(&slot.jam_mulai))
        .collect()
}
