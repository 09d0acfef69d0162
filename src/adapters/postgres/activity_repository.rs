use async_trait::async_trait;
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use super::store::{PostgresTx, invalid_data};
use crate::domain::{Activity, ActivityId, BarbershopId};
use crate::ports::ActivityRepository;
use crate::ports::store::Result;

const SELECT_ACTIVITY: &str = r#"
    SELECT activity_id, barbershop_id, name, price_cents, duration_minutes, image_url,
           created_at, updated_at
    FROM activities
"#;

fn map_row_to_activity(row: &PgRow) -> Result<Activity> {
    let duration_minutes: i32 = row.get("duration_minutes");
    let duration_minutes = u32::try_from(duration_minutes)
        .map_err(|_| invalid_data(format!("negative activity duration {duration_minutes}")))?;

    Ok(Activity {
        activity_id: ActivityId::from_uuid(row.get("activity_id")),
        barbershop_id: BarbershopId::from_uuid(row.get("barbershop_id")),
        name: row.get("name"),
        price_cents: row.get("price_cents"),
        duration_minutes,
        image_url: row.get("image_url"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl ActivityRepository for PostgresTx {
    async fn find_by_id(&mut self, activity_id: ActivityId) -> Result<Option<Activity>> {
        let row = sqlx::query(&format!("{SELECT_ACTIVITY} WHERE activity_id = $1"))
            .bind(activity_id.value())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(map_row_to_activity).transpose()
    }

    async fn find_by_ids(&mut self, activity_ids: &[ActivityId]) -> Result<Vec<Activity>> {
        let ids: Vec<Uuid> = activity_ids.iter().map(|id| id.value()).collect();
        let rows = sqlx::query(&format!(
            "{SELECT_ACTIVITY} WHERE activity_id = ANY($1) ORDER BY name ASC"
        ))
        .bind(&ids)
        .fetch_all(&mut *self.tx)
        .await?;
        rows.iter().map(map_row_to_activity).collect()
    }

    async fn list_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<Vec<Activity>> {
        let rows = sqlx::query(&format!(
            "{SELECT_ACTIVITY} WHERE barbershop_id = $1 ORDER BY name ASC"
        ))
        .bind(barbershop_id.value())
        .fetch_all(&mut *self.tx)
        .await?;
        rows.iter().map(map_row_to_activity).collect()
    }

    async fn save(&mut self, activity: &Activity) -> Result<()> {
        let duration_minutes = i32::try_from(activity.duration_minutes).map_err(|_| {
            invalid_data(format!(
                "activity duration {} does not fit the column",
                activity.duration_minutes
            ))
        })?;

        sqlx::query(
            r#"
            INSERT INTO activities (
                activity_id, barbershop_id, name, price_cents, duration_minutes, image_url,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (activity_id) DO UPDATE SET
                name = EXCLUDED.name,
                price_cents = EXCLUDED.price_cents,
                duration_minutes = EXCLUDED.duration_minutes,
                image_url = EXCLUDED.image_url,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(activity.activity_id.value())
        .bind(activity.barbershop_id.value())
        .bind(&activity.name)
        .bind(activity.price_cents)
        .bind(duration_minutes)
        .bind(&activity.image_url)
        .bind(activity.created_at)
        .bind(activity.updated_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete(&mut self, activity_id: ActivityId) -> Result<()> {
        sqlx::query("DELETE FROM activities WHERE activity_id = $1")
            .bind(activity_id.value())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<()> {
        sqlx::query("DELETE FROM activities WHERE barbershop_id = $1")
            .bind(barbershop_id.value())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}
