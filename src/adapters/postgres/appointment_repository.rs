use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use super::store::{PostgresTx, invalid_data, map_constraint};
use crate::domain::{
    ActivityId, Appointment, AppointmentId, AppointmentStatus, BarberId, BarbershopId,
    CustomerId, TimeRange,
};
use crate::ports::AppointmentRepository;
use crate::ports::store::Result;

const SELECT_APPOINTMENT: &str = r#"
    SELECT a.appointment_id, a.barbershop_id, a.barber_id, a.customer_id,
           a.start_time, a.end_time, a.status, a.created_at, a.updated_at,
           COALESCE(
               array_agg(aa.activity_id) FILTER (WHERE aa.activity_id IS NOT NULL),
               '{}'::uuid[]
           ) AS activity_ids
    FROM appointments a
    LEFT JOIN appointment_activities aa ON aa.appointment_id = a.appointment_id
"#;

const GROUP_AND_ORDER: &str = "GROUP BY a.appointment_id ORDER BY a.start_time ASC";

fn map_row_to_appointment(row: &PgRow) -> Result<Appointment> {
    let start: DateTime<Utc> = row.get("start_time");
    let end: DateTime<Utc> = row.get("end_time");
    let time = TimeRange::new(start, end)
        .map_err(|_| invalid_data(format!("appointment ends at {end} before {start}")))?;

    let status: String = row.get("status");
    let status: AppointmentStatus = status.parse().map_err(invalid_data)?;

    let activity_ids: Vec<Uuid> = row.get("activity_ids");

    Ok(Appointment {
        appointment_id: AppointmentId::from_uuid(row.get("appointment_id")),
        barbershop_id: BarbershopId::from_uuid(row.get("barbershop_id")),
        barber_id: BarberId::from_uuid(row.get("barber_id")),
        customer_id: CustomerId::from_uuid(row.get("customer_id")),
        time,
        status,
        activity_ids: activity_ids.into_iter().map(ActivityId::from_uuid).collect(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn map_rows(rows: &[PgRow]) -> Result<Vec<Appointment>> {
    rows.iter().map(map_row_to_appointment).collect()
}

impl PostgresTx {
    async fn exists(&mut self, sql: &str, id: Uuid) -> Result<bool> {
        let row = sqlx::query(sql).bind(id).fetch_one(&mut *self.tx).await?;
        Ok(row.get::<bool, _>(0))
    }
}

#[async_trait]
impl AppointmentRepository for PostgresTx {
    async fn find_by_id(&mut self, appointment_id: AppointmentId) -> Result<Option<Appointment>> {
        let row = sqlx::query(&format!(
            "{SELECT_APPOINTMENT} WHERE a.appointment_id = $1 GROUP BY a.appointment_id"
        ))
        .bind(appointment_id.value())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.as_ref().map(map_row_to_appointment).transpose()
    }

    /// Locks the appointment row alone; the aggregate read cannot carry
    /// `FOR UPDATE`.
    async fn find_by_id_for_update(
        &mut self,
        appointment_id: AppointmentId,
    ) -> Result<Option<Appointment>> {
        let locked = sqlx::query(
            "SELECT appointment_id FROM appointments WHERE appointment_id = $1 FOR UPDATE",
        )
        .bind(appointment_id.value())
        .fetch_optional(&mut *self.tx)
        .await?;
        if locked.is_none() {
            return Ok(None);
        }
        AppointmentRepository::find_by_id(self, appointment_id).await
    }

    /// Upserts the row and replaces the activity set.
    async fn save(&mut self, appointment: &Appointment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO appointments (
                appointment_id, barbershop_id, barber_id, customer_id,
                start_time, end_time, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (appointment_id) DO UPDATE SET
                barbershop_id = EXCLUDED.barbershop_id,
                barber_id = EXCLUDED.barber_id,
                start_time = EXCLUDED.start_time,
                end_time = EXCLUDED.end_time,
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(appointment.appointment_id.value())
        .bind(appointment.barbershop_id.value())
        .bind(appointment.barber_id.value())
        .bind(appointment.customer_id.value())
        .bind(appointment.start_time())
        .bind(appointment.end_time())
        .bind(appointment.status.as_str())
        .bind(appointment.created_at)
        .bind(appointment.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_constraint)?;

        sqlx::query("DELETE FROM appointment_activities WHERE appointment_id = $1")
            .bind(appointment.appointment_id.value())
            .execute(&mut *self.tx)
            .await?;

        let activity_ids: Vec<Uuid> = appointment
            .activity_ids
            .iter()
            .map(|id| id.value())
            .collect();
        if !activity_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO appointment_activities (appointment_id, activity_id)
                SELECT $1, UNNEST($2::uuid[])
                "#,
            )
            .bind(appointment.appointment_id.value())
            .bind(&activity_ids)
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(())
    }

    async fn delete(&mut self, appointment_id: AppointmentId) -> Result<()> {
        sqlx::query("DELETE FROM appointments WHERE appointment_id = $1")
            .bind(appointment_id.value())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn overlapping_for_barber(
        &mut self,
        barber_id: BarberId,
        range: &TimeRange,
    ) -> Result<Vec<Appointment>> {
        let rows = sqlx::query(&format!(
            r#"{SELECT_APPOINTMENT}
            WHERE a.barber_id = $1 AND a.start_time < $3 AND a.end_time > $2
            {GROUP_AND_ORDER}"#
        ))
        .bind(barber_id.value())
        .bind(range.start())
        .bind(range.end())
        .fetch_all(&mut *self.tx)
        .await?;
        map_rows(&rows)
    }

    async fn overlapping_for_customer(
        &mut self,
        customer_id: CustomerId,
        range: &TimeRange,
    ) -> Result<Vec<Appointment>> {
        let rows = sqlx::query(&format!(
            r#"{SELECT_APPOINTMENT}
            WHERE a.customer_id = $1 AND a.start_time < $3 AND a.end_time > $2
            {GROUP_AND_ORDER}"#
        ))
        .bind(customer_id.value())
        .bind(range.start())
        .bind(range.end())
        .fetch_all(&mut *self.tx)
        .await?;
        map_rows(&rows)
    }

    async fn list_for_customer(&mut self, customer_id: CustomerId) -> Result<Vec<Appointment>> {
        let rows = sqlx::query(&format!(
            "{SELECT_APPOINTMENT} WHERE a.customer_id = $1 {GROUP_AND_ORDER}"
        ))
        .bind(customer_id.value())
        .fetch_all(&mut *self.tx)
        .await?;
        map_rows(&rows)
    }

    async fn list_for_barber(&mut self, barber_id: BarberId) -> Result<Vec<Appointment>> {
        let rows = sqlx::query(&format!(
            "{SELECT_APPOINTMENT} WHERE a.barber_id = $1 {GROUP_AND_ORDER}"
        ))
        .bind(barber_id.value())
        .fetch_all(&mut *self.tx)
        .await?;
        map_rows(&rows)
    }

    async fn list_for_barbershop(
        &mut self,
        barbershop_id: BarbershopId,
    ) -> Result<Vec<Appointment>> {
        let rows = sqlx::query(&format!(
            "{SELECT_APPOINTMENT} WHERE a.barbershop_id = $1 {GROUP_AND_ORDER}"
        ))
        .bind(barbershop_id.value())
        .fetch_all(&mut *self.tx)
        .await?;
        map_rows(&rows)
    }

    async fn exists_scheduled_for_barbershop(
        &mut self,
        barbershop_id: BarbershopId,
    ) -> Result<bool> {
        self.exists(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM appointments
                WHERE barbershop_id = $1 AND status = 'scheduled'
            )
            "#,
            barbershop_id.value(),
        )
        .await
    }

    async fn exists_scheduled_for_activity(&mut self, activity_id: ActivityId) -> Result<bool> {
        self.exists(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM appointments a
                JOIN appointment_activities aa ON aa.appointment_id = a.appointment_id
                WHERE aa.activity_id = $1 AND a.status = 'scheduled'
            )
            "#,
            activity_id.value(),
        )
        .await
    }

    async fn any_for_barber(&mut self, barber_id: BarberId) -> Result<bool> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM appointments WHERE barber_id = $1)",
            barber_id.value(),
        )
        .await
    }

    async fn any_for_customer(&mut self, customer_id: CustomerId) -> Result<bool> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM appointments WHERE customer_id = $1)",
            customer_id.value(),
        )
        .await
    }
}
