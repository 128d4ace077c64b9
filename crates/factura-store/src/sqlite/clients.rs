//! # Client Table Operations
//!
//! ## Soft Delete
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  soft_delete_client  →  deleted_at = now                               │
//! │                                                                         │
//! │  list_clients        →  WHERE deleted_at IS NULL (hidden)              │
//! │  get_client          →  still found (documents keep their reference)   │
//! │                                                                         │
//! │  hard_delete_client  →  DELETE (FK violation while documents exist)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::contract::ClientStore;
use crate::error::{StoreError, StoreResult};
use crate::sqlite::pool::Database;
use crate::sqlite::rows::{format_datetime, ClientRow};
use factura_core::Client;

const CLIENT_COLUMNS: &str = "id, company_name, first_name, last_name, email, phone, \
     address, postal_code, city, country, siret, vat_number, notes, is_professional, \
     created_at, updated_at, deleted_at";

/// Inserts one client row on an open connection. Shared with the snapshot
/// restore path.
pub(crate) async fn insert_client_row(
    conn: &mut SqliteConnection,
    client: &Client,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO clients (
            id, company_name, first_name, last_name, email, phone,
            address, postal_code, city, country, siret, vat_number, notes,
            is_professional, created_at, updated_at, deleted_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10, ?11, ?12, ?13,
            ?14, ?15, ?16, ?17
        )
        "#,
    )
    .bind(&client.id)
    .bind(&client.company_name)
    .bind(&client.first_name)
    .bind(&client.last_name)
    .bind(&client.email)
    .bind(&client.phone)
    .bind(&client.address)
    .bind(&client.postal_code)
    .bind(&client.city)
    .bind(&client.country)
    .bind(&client.siret)
    .bind(&client.vat_number)
    .bind(&client.notes)
    .bind(client.is_professional)
    .bind(format_datetime(client.created_at))
    .bind(format_datetime(client.updated_at))
    .bind(client.deleted_at.map(format_datetime))
    .execute(conn)
    .await?;

    Ok(())
}

#[async_trait]
impl ClientStore for Database {
    async fn insert_client(&self, client: &Client) -> StoreResult<()> {
        debug!(id = %client.id, "Inserting client");

        let mut conn = self.pool().acquire().await?;
        insert_client_row(&mut conn, client).await
    }

    async fn get_client(&self, id: &str) -> StoreResult<Option<Client>> {
        let row: Option<ClientRow> = sqlx::query_as(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(ClientRow::into_client).transpose()
    }

    async fn list_clients(&self) -> StoreResult<Vec<Client>> {
        // Ordered by what the UI shows: company name, else last name
        let rows: Vec<ClientRow> = sqlx::query_as(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients \
             WHERE deleted_at IS NULL \
             ORDER BY COALESCE(company_name, last_name, '') COLLATE NOCASE"
        ))
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(ClientRow::into_client).collect()
    }

    async fn update_client(&self, client: &Client) -> StoreResult<()> {
        debug!(id = %client.id, "Updating client");

        let result = sqlx::query(
            r#"
            UPDATE clients SET
                company_name = ?2,
                first_name = ?3,
                last_name = ?4,
                email = ?5,
                phone = ?6,
                address = ?7,
                postal_code = ?8,
                city = ?9,
                country = ?10,
                siret = ?11,
                vat_number = ?12,
                notes = ?13,
                is_professional = ?14,
                updated_at = ?15
            WHERE id = ?1
            "#,
        )
        .bind(&client.id)
        .bind(&client.company_name)
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(&client.postal_code)
        .bind(&client.city)
        .bind(&client.country)
        .bind(&client.siret)
        .bind(&client.vat_number)
        .bind(&client.notes)
        .bind(client.is_professional)
        .bind(format_datetime(client.updated_at))
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Client", &client.id));
        }

        Ok(())
    }

    async fn soft_delete_client(&self, id: &str, deleted_at: DateTime<Utc>) -> StoreResult<()> {
        debug!(id = %id, "Soft-deleting client");

        let result = sqlx::query(
            "UPDATE clients SET deleted_at = ?2, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(format_datetime(deleted_at))
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Client", id));
        }

        Ok(())
    }

    async fn hard_delete_client(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Hard-deleting client");

        let result = sqlx::query("DELETE FROM clients WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Client", id));
        }

        Ok(())
    }
}
