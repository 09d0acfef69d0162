use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{ActivityId, BarberId, BarbershopId, CustomerId, WorkHours};

/// Contact data captured at registration.
///
/// Registration and password hashing happen outside this crate; the hash is
/// stored as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountData {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub document_number: String,
    pub password_hash: String,
}

/// Barber aggregate
///
/// The barber owns its membership pointer: the barbershop never lists its
/// staff, it is found by querying barbers with a matching `barbershop_id`.
///
/// Invariants:
/// - `is_owner` implies `barbershop_id.is_some()`
/// - `activity_ids` is a subset of the current barbershop's activities and is
///   empty while the barber has no barbershop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barber {
    pub barber_id: BarberId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub document_number: String,
    pub password_hash: String,
    pub is_owner: bool,
    pub work_hours: Option<WorkHours>,
    pub barbershop_id: Option<BarbershopId>,
    pub activity_ids: BTreeSet<ActivityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Barber {
    /// A freshly registered barber: no barbershop, no activities.
    pub fn register(
        data: AccountData,
        work_hours: Option<WorkHours>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            barber_id: BarberId::new(),
            name: data.name,
            phone: data.phone,
            email: data.email,
            document_number: data.document_number,
            password_hash: data.password_hash,
            is_owner: false,
            work_hours,
            barbershop_id: None,
            activity_ids: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_membership(&self) -> bool {
        self.barbershop_id.is_some()
    }

    pub fn is_member_of(&self, barbershop_id: BarbershopId) -> bool {
        self.barbershop_id == Some(barbershop_id)
    }

    /// Owner of exactly this barbershop
    pub fn owns(&self, barbershop_id: BarbershopId) -> bool {
        self.is_owner && self.is_member_of(barbershop_id)
    }

    /// The barbershop this barber owns, if any
    pub fn owned_barbershop(&self) -> Option<BarbershopId> {
        if self.is_owner { self.barbershop_id } else { None }
    }

    pub fn can_perform(&self, activity_id: ActivityId) -> bool {
        self.activity_ids.contains(&activity_id)
    }
}

/// Customer aggregate. Only related to barbershops through appointments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub document_number: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn register(data: AccountData, now: DateTime<Utc>) -> Self {
        Self {
            customer_id: CustomerId::new(),
            name: data.name,
            phone: data.phone,
            email: data.email,
            document_number: data.document_number,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}
