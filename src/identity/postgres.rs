//! Postgres-backed stores (`sql/schema.sql`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    PgPool, Row,
    postgres::{PgPoolOptions, PgRow},
};
use std::time::Duration;
use tracing::{Instrument, info_span};
use uuid::Uuid;

use super::account::{Account, NewAccount, VerificationState};
use super::store::{CredentialStore, OtpRecord, StoreError, VerificationRecordStore};

const ACCOUNT_COLUMNS: &str =
    "id, email, name, phone, password_hash, is_verified, verification_token, created_at";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a small pool to `dsn`.
    ///
    /// # Errors
    /// Returns an error if the database is unreachable.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn query_span(operation: &'static str, statement: &str) -> tracing::Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn account_from_row(row: &PgRow) -> Result<Account> {
    let verified: bool = row.try_get("is_verified")?;
    Ok(Account {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        password_hash: row.try_get("password_hash")?,
        state: VerificationState::from_verified(verified),
        activation_token: row.try_get("verification_token")?,
        created_at: row.try_get("created_at")?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await
            .context("failed to lookup account")?;

        Ok(row.as_ref().map(account_from_row).transpose()?)
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let query = format!(
            "INSERT INTO users (id, email, name, phone, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&account.email)
            .bind(&account.name)
            .bind(&account.phone)
            .bind(&account.password_hash)
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", &query))
            .await;

        match row {
            Ok(row) => Ok(account_from_row(&row)?),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Conflict),
            Err(err) => Err(anyhow::Error::from(err)
                .context("failed to insert account")
                .into()),
        }
    }

    async fn set_activation_token(&self, email: &str, token: &str) -> Result<bool, StoreError> {
        let query = r"
            UPDATE users
            SET verification_token = $2
            WHERE email = $1 AND is_verified = FALSE
        ";
        let result = sqlx::query(query)
            .bind(email)
            .bind(token)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to store activation token")?;
        Ok(result.rows_affected() == 1)
    }

    async fn activate_by_token(&self, token: &str) -> Result<Option<Account>, StoreError> {
        // Single statement: flag and token change together or not at all.
        let query = format!(
            "UPDATE users
             SET is_verified = TRUE, verification_token = NULL
             WHERE verification_token = $1
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(token)
            .fetch_optional(&self.pool)
            .instrument(query_span("UPDATE", &query))
            .await
            .context("failed to activate account")?;

        Ok(row.as_ref().map(account_from_row).transpose()?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let query = "SELECT 1";
        sqlx::query(query)
            .execute(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to ping database")?;
        Ok(())
    }
}

#[async_trait]
impl VerificationRecordStore for PgStore {
    async fn upsert_otp(&self, record: OtpRecord) -> Result<(), StoreError> {
        let query = r"
            INSERT INTO otp_codes (email, code_hash, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
            SET code_hash = EXCLUDED.code_hash,
                expires_at = EXCLUDED.expires_at,
                created_at = NOW()
        ";
        sqlx::query(query)
            .bind(&record.email)
            .bind(&record.code_hash)
            .bind(record.expires_at)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
            .context("failed to upsert otp")?;
        Ok(())
    }

    async fn find_otp(&self, email: &str) -> Result<Option<OtpRecord>, StoreError> {
        let query = "SELECT email, code_hash, expires_at FROM otp_codes WHERE email = $1";
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to lookup otp")?;

        let record = row
            .map(|row| -> Result<OtpRecord> {
                Ok(OtpRecord {
                    email: row.try_get("email")?,
                    code_hash: row.try_get("code_hash")?,
                    expires_at: row.try_get("expires_at")?,
                })
            })
            .transpose()?;
        Ok(record)
    }

    async fn delete_otp(&self, email: &str, code_hash: &str) -> Result<bool, StoreError> {
        let query = "DELETE FROM otp_codes WHERE email = $1 AND code_hash = $2";
        let result = sqlx::query(query)
            .bind(email)
            .bind(code_hash)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await
            .context("failed to delete otp")?;
        Ok(result.rows_affected() == 1)
    }

    async fn consume_otp(&self, email: &str, code_hash: &str) -> Result<bool, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("begin consume-otp transaction")?;

        let query = "DELETE FROM otp_codes WHERE email = $1 AND code_hash = $2";
        let deleted = sqlx::query(query)
            .bind(email)
            .bind(code_hash)
            .execute(&mut *tx)
            .instrument(query_span("DELETE", query))
            .await
            .context("failed to delete consumed otp")?;

        if deleted.rows_affected() != 1 {
            let _ = tx.rollback().await;
            return Ok(false);
        }

        let query = r"
            UPDATE users
            SET is_verified = TRUE, verification_token = NULL
            WHERE email = $1
        ";
        let updated = sqlx::query(query)
            .bind(email)
            .execute(&mut *tx)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to mark account verified")?;

        if updated.rows_affected() != 1 {
            let _ = tx.rollback().await;
            return Ok(false);
        }

        tx.commit().await.context("commit consume-otp transaction")?;
        Ok(true)
    }
}
