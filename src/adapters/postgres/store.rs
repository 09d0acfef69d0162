use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::{BarberId, CustomerId};
use crate::ports::store::{BoxError, Result};
use crate::ports::{
    ActivityRepository, AppointmentRepository, BarberRepository, BarbershopRepository,
    CustomerRepository, DuplicateKeyError, HighlightRepository, JoinRequestRepository,
    ScheduleOverlapError, Store, StoreTx,
};

/// SQLSTATE raised by a unique index or constraint
const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE raised by an exclusion constraint
const EXCLUSION_VIOLATION: &str = "23P01";

/// PostgreSQL store
///
/// Each `begin` checks a connection out of the pool and opens a database
/// transaction on it.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTx { tx }))
    }
}

/// Open PostgreSQL transaction. Dropping it rolls back.
pub struct PostgresTx {
    pub(super) tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PostgresTx {
    fn barbershops(&mut self) -> &mut dyn BarbershopRepository {
        self
    }

    fn barbers(&mut self) -> &mut dyn BarberRepository {
        self
    }

    fn customers(&mut self) -> &mut dyn CustomerRepository {
        self
    }

    fn activities(&mut self) -> &mut dyn ActivityRepository {
        self
    }

    fn appointments(&mut self) -> &mut dyn AppointmentRepository {
        self
    }

    fn join_requests(&mut self) -> &mut dyn JoinRequestRepository {
        self
    }

    fn highlights(&mut self) -> &mut dyn HighlightRepository {
        self
    }

    /// Row lock on the barber until commit or rollback.
    async fn lock_barber_schedule(&mut self, barber_id: BarberId) -> Result<()> {
        sqlx::query("SELECT barber_id FROM barbers WHERE barber_id = $1 FOR UPDATE")
            .bind(barber_id.value())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    /// Row lock on the customer until commit or rollback.
    async fn lock_customer_schedule(&mut self, customer_id: CustomerId) -> Result<()> {
        sqlx::query("SELECT customer_id FROM customers WHERE customer_id = $1 FOR UPDATE")
            .bind(customer_id.value())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

/// Turn violations of the constraints the ports name into their typed
/// errors. Anything else passes through unchanged.
pub(super) fn map_constraint(err: sqlx::Error) -> BoxError {
    if let sqlx::Error::Database(db) = &err {
        let typed: Option<BoxError> = match (db.code().as_deref(), db.constraint()) {
            (Some(EXCLUSION_VIOLATION), Some("appointments_no_overlap")) => {
                Some(Box::new(ScheduleOverlapError))
            }
            (Some(UNIQUE_VIOLATION), Some("barbershops_registration_number_key")) => {
                Some(Box::new(DuplicateKeyError::RegistrationNumber))
            }
            (Some(UNIQUE_VIOLATION), Some("idx_join_requests_pending")) => {
                Some(Box::new(DuplicateKeyError::PendingJoinRequest))
            }
            _ => None,
        };
        if let Some(typed) = typed {
            return typed;
        }
    }
    Box::new(err)
}

/// Row data that does not fit the domain type
pub(super) fn invalid_data(message: impl Into<String>) -> BoxError {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message.into(),
    ))
}
