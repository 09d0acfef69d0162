use async_trait::async_trait;
use sqlx::{Row, postgres::PgRow};

use super::store::{PostgresTx, invalid_data, map_constraint};
use crate::domain::{
    BarberId, BarbershopId, Highlight, HighlightId, JoinRequest, JoinRequestId,
    JoinRequestStatus,
};
use crate::ports::store::Result;
use crate::ports::{HighlightRepository, JoinRequestRepository};

const SELECT_JOIN_REQUEST: &str = r#"
    SELECT join_request_id, barber_id, barbershop_id, status, created_at
    FROM join_requests
"#;

const SELECT_HIGHLIGHT: &str = r#"
    SELECT highlight_id, barbershop_id, image_url, public_id, created_at
    FROM highlights
"#;

fn map_row_to_join_request(row: &PgRow) -> Result<JoinRequest> {
    let status: String = row.get("status");
    let status: JoinRequestStatus = status.parse().map_err(invalid_data)?;

    Ok(JoinRequest {
        join_request_id: JoinRequestId::from_uuid(row.get("join_request_id")),
        barber_id: BarberId::from_uuid(row.get("barber_id")),
        barbershop_id: BarbershopId::from_uuid(row.get("barbershop_id")),
        status,
        created_at: row.get("created_at"),
    })
}

fn map_row_to_highlight(row: &PgRow) -> Highlight {
    Highlight {
        highlight_id: HighlightId::from_uuid(row.get("highlight_id")),
        barbershop_id: BarbershopId::from_uuid(row.get("barbershop_id")),
        image_url: row.get("image_url"),
        public_id: row.get("public_id"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl JoinRequestRepository for PostgresTx {
    async fn find_by_id(&mut self, join_request_id: JoinRequestId) -> Result<Option<JoinRequest>> {
        let row = sqlx::query(&format!("{SELECT_JOIN_REQUEST} WHERE join_request_id = $1"))
            .bind(join_request_id.value())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(map_row_to_join_request).transpose()
    }

    async fn find_pending(
        &mut self,
        barber_id: BarberId,
        barbershop_id: BarbershopId,
    ) -> Result<Option<JoinRequest>> {
        let row = sqlx::query(&format!(
            r#"{SELECT_JOIN_REQUEST}
            WHERE barber_id = $1 AND barbershop_id = $2 AND status = 'pending'"#
        ))
        .bind(barber_id.value())
        .bind(barbershop_id.value())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.as_ref().map(map_row_to_join_request).transpose()
    }

    async fn list_pending_for_barbershop(
        &mut self,
        barbershop_id: BarbershopId,
    ) -> Result<Vec<JoinRequest>> {
        let rows = sqlx::query(&format!(
            r#"{SELECT_JOIN_REQUEST}
            WHERE barbershop_id = $1 AND status = 'pending'
            ORDER BY created_at ASC"#
        ))
        .bind(barbershop_id.value())
        .fetch_all(&mut *self.tx)
        .await?;
        rows.iter().map(map_row_to_join_request).collect()
    }

    async fn list_for_barber(&mut self, barber_id: BarberId) -> Result<Vec<JoinRequest>> {
        let rows = sqlx::query(&format!(
            "{SELECT_JOIN_REQUEST} WHERE barber_id = $1 ORDER BY created_at ASC"
        ))
        .bind(barber_id.value())
        .fetch_all(&mut *self.tx)
        .await?;
        rows.iter().map(map_row_to_join_request).collect()
    }

    async fn save(&mut self, request: &JoinRequest) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO join_requests (
                join_request_id, barber_id, barbershop_id, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (join_request_id) DO UPDATE SET status = EXCLUDED.status
            "#,
        )
        .bind(request.join_request_id.value())
        .bind(request.barber_id.value())
        .bind(request.barbershop_id.value())
        .bind(request.status.as_str())
        .bind(request.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_constraint)?;
        Ok(())
    }

    async fn delete(&mut self, join_request_id: JoinRequestId) -> Result<()> {
        sqlx::query("DELETE FROM join_requests WHERE join_request_id = $1")
            .bind(join_request_id.value())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<()> {
        sqlx::query("DELETE FROM join_requests WHERE barbershop_id = $1")
            .bind(barbershop_id.value())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_by_barber(&mut self, barber_id: BarberId) -> Result<()> {
        sqlx::query("DELETE FROM join_requests WHERE barber_id = $1")
            .bind(barber_id.value())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl HighlightRepository for PostgresTx {
    async fn find_by_id(&mut self, highlight_id: HighlightId) -> Result<Option<Highlight>> {
        let row = sqlx::query(&format!("{SELECT_HIGHLIGHT} WHERE highlight_id = $1"))
            .bind(highlight_id.value())
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.as_ref().map(map_row_to_highlight))
    }

    async fn list_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<Vec<Highlight>> {
        let rows = sqlx::query(&format!(
            "{SELECT_HIGHLIGHT} WHERE barbershop_id = $1 ORDER BY created_at ASC"
        ))
        .bind(barbershop_id.value())
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows.iter().map(map_row_to_highlight).collect())
    }

    async fn save(&mut self, highlight: &Highlight) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO highlights (highlight_id, barbershop_id, image_url, public_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (highlight_id) DO UPDATE SET
                image_url = EXCLUDED.image_url,
                public_id = EXCLUDED.public_id
            "#,
        )
        .bind(highlight.highlight_id.value())
        .bind(highlight.barbershop_id.value())
        .bind(&highlight.image_url)
        .bind(&highlight.public_id)
        .bind(highlight.created_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete(&mut self, highlight_id: HighlightId) -> Result<()> {
        sqlx::query("DELETE FROM highlights WHERE highlight_id = $1")
            .bind(highlight_id.value())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_by_barbershop(&mut self, barbershop_id: BarbershopId) -> Result<()> {
        sqlx::query("DELETE FROM highlights WHERE barbershop_id = $1")
            .bind(barbershop_id.value())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}
