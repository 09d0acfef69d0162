use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ActivityId, BarberId, BarbershopId};

/// Command: reserve a time block with a barber
///
/// Also used to reschedule: the whole request is validated again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookAppointment {
    pub barbershop_id: BarbershopId,
    pub barber_id: BarberId,
    pub activity_ids: Vec<ActivityId>,
    pub start_time: DateTime<Utc>,
}

/// Command: open a new barbershop owned by the requesting barber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBarbershop {
    pub name: String,
    pub registration_number: String,
    pub address: Option<String>,
}

/// Command: change the public data of a barbershop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBarbershop {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// Command: publish a bookable service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateActivity {
    pub name: String,
    pub price_cents: i64,
    pub duration_minutes: u32,
}

/// Command: change a bookable service; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateActivity {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub duration_minutes: Option<u32>,
}

/// Command: set a barber's daily working window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetWorkHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Command: attach an uploaded showcase image to a barbershop
///
/// The upload itself happens outside; only the returned references are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddHighlight {
    pub image_url: String,
    pub public_id: Option<String>,
}
