use async_trait::async_trait;
use sqlx::{Row, postgres::PgRow};

use super::store::{PostgresTx, map_constraint};
use crate::domain::{Barbershop, BarbershopId};
use crate::ports::BarbershopRepository;
use crate::ports::store::Result;

const SELECT_BARBERSHOP: &str = r#"
    SELECT barbershop_id, name, registration_number, address, logo_url, banner_url,
           created_at, updated_at
    FROM barbershops
"#;

fn map_row_to_barbershop(row: &PgRow) -> Barbershop {
    Barbershop {
        barbershop_id: BarbershopId::from_uuid(row.get("barbershop_id")),
        name: row.get("name"),
        registration_number: row.get("registration_number"),
        address: row.get("address"),
        logo_url: row.get("logo_url"),
        banner_url: row.get("banner_url"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl BarbershopRepository for PostgresTx {
    async fn find_by_id(&mut self, barbershop_id: BarbershopId) -> Result<Option<Barbershop>> {
        let row = sqlx::query(&format!("{SELECT_BARBERSHOP} WHERE barbershop_id = $1"))
            .bind(barbershop_id.value())
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.as_ref().map(map_row_to_barbershop))
    }

    async fn find_by_id_for_update(
        &mut self,
        barbershop_id: BarbershopId,
    ) -> Result<Option<Barbershop>> {
        let row = sqlx::query(&format!(
            "{SELECT_BARBERSHOP} WHERE barbershop_id = $1 FOR UPDATE"
        ))
        .bind(barbershop_id.value())
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.as_ref().map(map_row_to_barbershop))
    }

    async fn find_by_registration_number(
        &mut self,
        registration_number: &str,
    ) -> Result<Option<Barbershop>> {
        let row = sqlx::query(&format!("{SELECT_BARBERSHOP} WHERE registration_number = $1"))
            .bind(registration_number)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.as_ref().map(map_row_to_barbershop))
    }

    async fn list(&mut self) -> Result<Vec<Barbershop>> {
        let rows = sqlx::query(&format!("{SELECT_BARBERSHOP} ORDER BY name ASC"))
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.iter().map(map_row_to_barbershop).collect())
    }

    async fn save(&mut self, barbershop: &Barbershop) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO barbershops (
                barbershop_id, name, registration_number, address, logo_url, banner_url,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (barbershop_id) DO UPDATE SET
                name = EXCLUDED.name,
                registration_number = EXCLUDED.registration_number,
                address = EXCLUDED.address,
                logo_url = EXCLUDED.logo_url,
                banner_url = EXCLUDED.banner_url,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(barbershop.barbershop_id.value())
        .bind(&barbershop.name)
        .bind(&barbershop.registration_number)
        .bind(&barbershop.address)
        .bind(&barbershop.logo_url)
        .bind(&barbershop.banner_url)
        .bind(barbershop.created_at)
        .bind(barbershop.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_constraint)?;
        Ok(())
    }

    async fn delete(&mut self, barbershop_id: BarbershopId) -> Result<()> {
        sqlx::query("DELETE FROM barbershops WHERE barbershop_id = $1")
            .bind(barbershop_id.value())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}
