use serde::{Deserialize, Serialize};

use super::{BarberId, CustomerId};

/// Signal raised inside the deleting transaction, before an account is removed.
///
/// Listeners may veto the deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeforeDelete {
    Barber(BarberId),
    Customer(CustomerId),
}

/// Why a listener refused a deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionVeto {
    /// Appointments still reference the barber
    BarberReferenced,
    /// Appointments still reference the customer
    CustomerReferenced,
}
