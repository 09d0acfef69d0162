use async_trait::async_trait;
use chrono::NaiveTime;
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use super::store::{PostgresTx, invalid_data};
use crate::domain::{
    ActivityId, Barber, BarberId, BarbershopId, Customer, CustomerId, WorkHours,
};
use crate::ports::store::Result;
use crate::ports::{BarberRepository, CustomerRepository};

/// Barber columns plus the assigned activity ids folded into one array
const SELECT_BARBER: &str = r#"
    SELECT b.barber_id, b.name, b.phone, b.email, b.document_number, b.password_hash,
           b.is_owner, b.work_start, b.work_end, b.barbershop_id, b.created_at, b.updated_at,
           COALESCE(
               array_agg(ba.activity_id) FILTER (WHERE ba.activity_id IS NOT NULL),
               '{}'::uuid[]
           ) AS activity_ids
    FROM barbers b
    LEFT JOIN barber_activities ba ON ba.barber_id = b.barber_id
"#;

const SELECT_CUSTOMER: &str = r#"
    SELECT customer_id, name, phone, email, document_number, password_hash,
           created_at, updated_at
    FROM customers
"#;

fn map_row_to_barber(row: &PgRow) -> Result<Barber> {
    let work_start: Option<NaiveTime> = row.get("work_start");
    let work_end: Option<NaiveTime> = row.get("work_end");
    let work_hours = match (work_start, work_end) {
        (Some(start), Some(end)) => Some(
            WorkHours::new(start, end)
                .map_err(|_| invalid_data(format!("work hours {start}-{end} are inverted")))?,
        ),
        (None, None) => None,
        _ => return Err(invalid_data("work hours must be set together")),
    };

    let barbershop_id: Option<Uuid> = row.get("barbershop_id");
    let activity_ids: Vec<Uuid> = row.get("activity_ids");

    Ok(Barber {
        barber_id: BarberId::from_uuid(row.get("barber_id")),
        name: row.get("name"),
        phone: row.get("phone"),
        email: row.get("email"),
        document_number: row.get("document_number"),
        password_hash: row.get("password_hash"),
        is_owner: row.get("is_owner"),
        work_hours,
        barbershop_id: barbershop_id.map(BarbershopId::from_uuid),
        activity_ids: activity_ids.into_iter().map(ActivityId::from_uuid).collect(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn map_row_to_customer(row: &PgRow) -> Customer {
    Customer {
        customer_id: CustomerId::from_uuid(row.get("customer_id")),
        name: row.get("name"),
        phone: row.get("phone"),
        email: row.get("email"),
        document_number: row.get("document_number"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl BarberRepository for PostgresTx {
    async fn find_by_id(&mut self, barber_id: BarberId) -> Result<Option<Barber>> {
        let row = sqlx::query(&format!(
            "{SELECT_BARBER} WHERE b.barber_id = $1 GROUP BY b.barber_id"
        ))
        .bind(barber_id.value())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.as_ref().map(map_row_to_barber).transpose()
    }

    async fn find_by_email(&mut self, email: &str) -> Result<Option<Barber>> {
        let row = sqlx::query(&format!(
            "{SELECT_BARBER} WHERE b.email = $1 GROUP BY b.barber_id"
        ))
        .bind(email)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.as_ref().map(map_row_to_barber).transpose()
    }

    /// Locks the barber row alone; the aggregate read cannot carry
    /// `FOR UPDATE`.
    async fn find_by_id_for_update(&mut self, barber_id: BarberId) -> Result<Option<Barber>> {
        let locked = sqlx::query("SELECT barber_id FROM barbers WHERE barber_id = $1 FOR UPDATE")
            .bind(barber_id.value())
            .fetch_optional(&mut *self.tx)
            .await?;
        if locked.is_none() {
            return Ok(None);
        }
        BarberRepository::find_by_id(self, barber_id).await
    }

    async fn find_by_email_for_update(&mut self, email: &str) -> Result<Option<Barber>> {
        let locked = sqlx::query("SELECT barber_id FROM barbers WHERE email = $1 FOR UPDATE")
            .bind(email)
            .fetch_optional(&mut *self.tx)
            .await?;
        match locked {
            Some(row) => {
                let barber_id = BarberId::from_uuid(row.get("barber_id"));
                BarberRepository::find_by_id(self, barber_id).await
            }
            None => Ok(None),
        }
    }

    async fn list_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<Vec<Barber>> {
        let rows = sqlx::query(&format!(
            "{SELECT_BARBER} WHERE b.barbershop_id = $1 GROUP BY b.barber_id ORDER BY b.name ASC"
        ))
        .bind(barbershop_id.value())
        .fetch_all(&mut *self.tx)
        .await?;
        rows.iter().map(map_row_to_barber).collect()
    }

    /// Upserts the row and replaces the assigned activity set.
    async fn save(&mut self, barber: &Barber) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO barbers (
                barber_id, name, phone, email, document_number, password_hash,
                is_owner, work_start, work_end, barbershop_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (barber_id) DO UPDATE SET
                name = EXCLUDED.name,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                document_number = EXCLUDED.document_number,
                password_hash = EXCLUDED.password_hash,
                is_owner = EXCLUDED.is_owner,
                work_start = EXCLUDED.work_start,
                work_end = EXCLUDED.work_end,
                barbershop_id = EXCLUDED.barbershop_id,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(barber.barber_id.value())
        .bind(&barber.name)
        .bind(&barber.phone)
        .bind(&barber.email)
        .bind(&barber.document_number)
        .bind(&barber.password_hash)
        .bind(barber.is_owner)
        .bind(barber.work_hours.map(|h| h.start()))
        .bind(barber.work_hours.map(|h| h.end()))
        .bind(barber.barbershop_id.map(|id| id.value()))
        .bind(barber.created_at)
        .bind(barber.updated_at)
        .execute(&mut *self.tx)
        .await?;

        sqlx::query("DELETE FROM barber_activities WHERE barber_id = $1")
            .bind(barber.barber_id.value())
            .execute(&mut *self.tx)
            .await?;

        let activity_ids: Vec<Uuid> = barber.activity_ids.iter().map(|id| id.value()).collect();
        if !activity_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO barber_activities (barber_id, activity_id)
                SELECT $1, UNNEST($2::uuid[])
                "#,
            )
            .bind(barber.barber_id.value())
            .bind(&activity_ids)
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(())
    }

    async fn delete(&mut self, barber_id: BarberId) -> Result<()> {
        sqlx::query("DELETE FROM barbers WHERE barber_id = $1")
            .bind(barber_id.value())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for PostgresTx {
    async fn find_by_id(&mut self, customer_id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query(&format!("{SELECT_CUSTOMER} WHERE customer_id = $1"))
            .bind(customer_id.value())
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.as_ref().map(map_row_to_customer))
    }

    async fn find_by_email(&mut self, email: &str) -> Result<Option<Customer>> {
        let row = sqlx::query(&format!("{SELECT_CUSTOMER} WHERE email = $1"))
            .bind(email)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.as_ref().map(map_row_to_customer))
    }

    async fn save(&mut self, customer: &Customer) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO customers (
                customer_id, name, phone, email, document_number, password_hash,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (customer_id) DO UPDATE SET
                name = EXCLUDED.name,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                document_number = EXCLUDED.document_number,
                password_hash = EXCLUDED.password_hash,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(customer.customer_id.value())
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.document_number)
        .bind(&customer.password_hash)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete(&mut self, customer_id: CustomerId) -> Result<()> {
        sqlx::query("DELETE FROM customers WHERE customer_id = $1")
            .bind(customer_id.value())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}
