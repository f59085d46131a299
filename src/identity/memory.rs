//! In-process store used when no database is configured.
//!
//! Accounts and OTP records sit behind one mutex so the cross-table
//! operations (`consume_otp`) are atomic.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::account::{Account, NewAccount, VerificationState};
use super::store::{CredentialStore, OtpRecord, StoreError, VerificationRecordStore};

#[derive(Default)]
struct Tables {
    accounts: HashMap<String, Account>,
    otps: HashMap<String, OtpRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.accounts.get(email).cloned())
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.accounts.contains_key(&account.email) {
            return Err(StoreError::Conflict);
        }
        let account = account.into_account();
        tables
            .accounts
            .insert(account.email.clone(), account.clone());
        Ok(account)
    }

    async fn set_activation_token(&self, email: &str, token: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        match tables.accounts.get_mut(email) {
            Some(account) if !account.is_verified() => {
                account.activation_token = Some(token.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn activate_by_token(&self, token: &str) -> Result<Option<Account>, StoreError> {
        let mut tables = self.tables.lock().await;
        let account = tables
            .accounts
            .values_mut()
            .find(|account| account.activation_token.as_deref() == Some(token));
        Ok(account.map(|account| {
            account.state = VerificationState::Verified;
            account.activation_token = None;
            account.clone()
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl VerificationRecordStore for MemoryStore {
    async fn upsert_otp(&self, record: OtpRecord) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables.otps.insert(record.email.clone(), record);
        Ok(())
    }

    async fn find_otp(&self, email: &str) -> Result<Option<OtpRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.otps.get(email).cloned())
    }

    async fn delete_otp(&self, email: &str, code_hash: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables
            .otps
            .get(email)
            .is_some_and(|record| record.code_hash == code_hash)
        {
            tables.otps.remove(email);
            return Ok(true);
        }
        Ok(false)
    }

    async fn consume_otp(&self, email: &str, code_hash: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let matches = tables
            .otps
            .get(email)
            .is_some_and(|record| record.code_hash == code_hash);
        if !matches || !tables.accounts.contains_key(email) {
            return Ok(false);
        }

        tables.otps.remove(email);
        if let Some(account) = tables.accounts.get_mut(email) {
            account.state = VerificationState::Verified;
            account.activation_token = None;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use chrono::{Duration, Utc};

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            name: "Alice".to_string(),
            phone: "555-0100".to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn otp(email: &str, hash: &str) -> OtpRecord {
        OtpRecord {
            email: email.to_string(),
            code_hash: hash.to_string(),
            expires_at: Utc::now() + Duration::minutes(10),
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() -> Result<()> {
        let store = MemoryStore::new();
        store.create(new_account("alice@example.com")).await?;
        let second = store.create(new_account("alice@example.com")).await;
        assert!(matches!(second, Err(StoreError::Conflict)));
        Ok(())
    }

    #[tokio::test]
    async fn activate_by_token_clears_token() -> Result<()> {
        let store = MemoryStore::new();
        store.create(new_account("alice@example.com")).await?;
        assert!(store.set_activation_token("alice@example.com", "t1").await?);

        let account = store
            .activate_by_token("t1")
            .await?
            .context("token should activate")?;
        assert!(account.is_verified());
        assert!(account.activation_token.is_none());
        assert!(store.activate_by_token("t1").await?.is_none());

        // Verified accounts no longer accept new tokens.
        assert!(!store.set_activation_token("alice@example.com", "t2").await?);
        Ok(())
    }

    #[tokio::test]
    async fn upsert_keeps_single_record() -> Result<()> {
        let store = MemoryStore::new();
        store.upsert_otp(otp("alice@example.com", "first")).await?;
        store.upsert_otp(otp("alice@example.com", "second")).await?;
        let record = store
            .find_otp("alice@example.com")
            .await?
            .context("record should exist")?;
        assert_eq!(record.code_hash, "second");
        assert!(!store.delete_otp("alice@example.com", "first").await?);
        Ok(())
    }

    #[tokio::test]
    async fn consume_otp_is_compare_and_delete() -> Result<()> {
        let store = MemoryStore::new();
        store.create(new_account("alice@example.com")).await?;
        store.upsert_otp(otp("alice@example.com", "h1")).await?;

        assert!(!store.consume_otp("alice@example.com", "stale").await?);
        assert!(store.consume_otp("alice@example.com", "h1").await?);
        assert!(store.find_otp("alice@example.com").await?.is_none());

        let account = store
            .find_by_email("alice@example.com")
            .await?
            .context("account should exist")?;
        assert!(account.is_verified());
        assert!(!store.consume_otp("alice@example.com", "h1").await?);
        Ok(())
    }
}
