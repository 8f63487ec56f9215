use anyhow::{Context, Result};
use card_core::ServiceCapabilities;
use card_sqlx::{PgPool, PgState, SchemaName};

use crate::services::contacts::contacts_shared::{self, TABLE};
use crate::services::{Contact, ContactChanges, ContactParams};

const COLUMNS: &str = "id, sfid, firstname, lastname, title, email, phone";

/// Contacts in the Heroku Connect mirror table.
///
/// Only plain `SELECT` and `UPDATE`; rows are created and deleted by the
/// sync service, and `sfid` is never written.
pub struct PgContacts {
    pool: PgPool,
    schema: SchemaName,
    pub capabilities: ServiceCapabilities,
}

impl PgState for PgContacts {
    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn schema(&self) -> &SchemaName {
        &self.schema
    }
}

impl PgContacts {
    pub fn new(pool: PgPool, schema: SchemaName) -> Self {
        Self {
            pool,
            schema,
            capabilities: contacts_shared::capabilities(),
        }
    }

    fn table(&self) -> String {
        self.schema().table(TABLE)
    }

    pub async fn _find(&self, _params: ContactParams) -> Result<Vec<Contact>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE sfid IS NOT NULL ORDER BY id",
            self.table()
        );

        let rows = sqlx::query_as::<_, Contact>(&sql)
            .fetch_all(self.pool())
            .await
            .context("failed to list contacts")?;

        tracing::debug!(count = rows.len(), "loaded contacts");
        Ok(rows)
    }

    pub async fn _get(&self, sfid: &str, _params: ContactParams) -> Result<Contact> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE sfid = $1", self.table());

        sqlx::query_as::<_, Contact>(&sql)
            .bind(sfid)
            .fetch_optional(self.pool())
            .await
            .context("failed to load contact")?
            .ok_or_else(|| contacts_shared::not_found(sfid))
    }

    /// One statement: the row is updated and returned, or nothing happens.
    pub async fn _patch(
        &self,
        sfid: &str,
        data: ContactChanges,
        _params: ContactParams,
    ) -> Result<Contact> {
        let sql = format!(
            "UPDATE {} SET firstname = $1, lastname = $2, title = $3, email = $4, phone = $5 \
             WHERE sfid = $6 RETURNING {COLUMNS}",
            self.table()
        );

        sqlx::query_as::<_, Contact>(&sql)
            .bind(data.firstname)
            .bind(data.lastname)
            .bind(data.title)
            .bind(data.email)
            .bind(data.phone)
            .bind(sfid)
            .fetch_optional(self.pool())
            .await
            .context("failed to update contact")?
            .ok_or_else(|| contacts_shared::not_found(sfid))
    }
}

card_core::card_adapter!(PgContacts, Contact, ContactParams);
