use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    ActivityId, AddHighlight, BarbershopId, CreateActivity, HighlightId, UpdateActivity,
    UpdateBarbershop,
};

/// Barbershop aggregate
///
/// Staff and activities point at the barbershop; it holds no collections of
/// its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barbershop {
    pub barbershop_id: BarbershopId,
    pub name: String,
    /// Unique business registration number (CNPJ)
    pub registration_number: String,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Barbershop {
    pub fn apply_update(&self, update: &UpdateBarbershop, now: DateTime<Utc>) -> Self {
        Self {
            name: update.name.clone().unwrap_or_else(|| self.name.clone()),
            address: update.address.clone().or_else(|| self.address.clone()),
            updated_at: now,
            ..self.clone()
        }
    }
}

/// A priced, timed service offered by exactly one barbershop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub activity_id: ActivityId,
    pub barbershop_id: BarbershopId,
    pub name: String,
    pub price_cents: i64,
    pub duration_minutes: u32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    /// Returns `None` for a zero duration.
    pub fn publish(
        barbershop_id: BarbershopId,
        cmd: &CreateActivity,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        if cmd.duration_minutes == 0 {
            return None;
        }
        Some(Self {
            activity_id: ActivityId::new(),
            barbershop_id,
            name: cmd.name.clone(),
            price_cents: cmd.price_cents,
            duration_minutes: cmd.duration_minutes,
            image_url: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns `None` if the update would set a zero duration.
    pub fn apply_update(&self, update: &UpdateActivity, now: DateTime<Utc>) -> Option<Self> {
        let duration_minutes = update.duration_minutes.unwrap_or(self.duration_minutes);
        if duration_minutes == 0 {
            return None;
        }
        Some(Self {
            name: update.name.clone().unwrap_or_else(|| self.name.clone()),
            price_cents: update.price_cents.unwrap_or(self.price_cents),
            duration_minutes,
            updated_at: now,
            ..self.clone()
        })
    }
}

/// Showcase image of a barbershop. Deleted together with the barbershop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub highlight_id: HighlightId,
    pub barbershop_id: BarbershopId,
    pub image_url: String,
    pub public_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Highlight {
    pub fn attach(barbershop_id: BarbershopId, cmd: &AddHighlight, now: DateTime<Utc>) -> Self {
        Self {
            highlight_id: HighlightId::new(),
            barbershop_id,
            image_url: cmd.image_url.clone(),
            public_id: cmd.public_id.clone(),
            created_at: now,
        }
    }
}
