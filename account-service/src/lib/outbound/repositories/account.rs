use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::BirthDate;
use crate::account::models::EmailAddress;
use crate::account::models::Gender;
use crate::account::models::PersonName;
use crate::account::models::Username;
use crate::account::models::VerificationToken;
use crate::account::ports::CredentialStore;
use crate::account::ports::VerificationTokenStore;

const ACCOUNT_COLUMNS: &str = "id, username, password_hash, email, first_name, last_name, \
                               birth_date, gender, enabled, locked, account_expired, \
                               credentials_expired, version, created_at";

pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PostgresAccountStore {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = $1"
        ))
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::Repository(e.to_string()))?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::Repository(e.to_string()))?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn save(&self, mut account: Account) -> Result<Account, AccountError> {
        // A version-guarded update first; zero rows means either a fresh
        // account (insert it) or a stale caller (conflict).
        let updated = sqlx::query(
            r#"
            UPDATE accounts
            SET username = $2, password_hash = $3, email = $4, first_name = $5,
                last_name = $6, birth_date = $7, gender = $8, enabled = $9,
                locked = $10, account_expired = $11, credentials_expired = $12,
                version = version + 1
            WHERE id = $1 AND version = $13
            "#,
        )
        .bind(account.id.0)
        .bind(account.username.as_str())
        .bind(&account.password_hash)
        .bind(account.email.as_str())
        .bind(account.first_name.as_str())
        .bind(account.last_name.as_str())
        .bind(account.birth_date.as_date())
        .bind(gender_to_column(account.gender))
        .bind(account.enabled)
        .bind(account.locked)
        .bind(account.account_expired)
        .bind(account.credentials_expired)
        .bind(account.version)
        .execute(&self.pool)
        .await
        .map_err(|e| AccountError::Repository(e.to_string()))?;

        if updated.rows_affected() == 1 {
            account.version += 1;
            return Ok(account);
        }

        let exists = sqlx::query("SELECT 1 FROM accounts WHERE id = $1")
            .bind(account.id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountError::Repository(e.to_string()))?;
        if exists.is_some() {
            return Err(AccountError::Conflict(account.id.to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO accounts (id, username, password_hash, email, first_name, last_name,
                                  birth_date, gender, enabled, locked, account_expired,
                                  credentials_expired, version, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(account.id.0)
        .bind(account.username.as_str())
        .bind(&account.password_hash)
        .bind(account.email.as_str())
        .bind(account.first_name.as_str())
        .bind(account.last_name.as_str())
        .bind(account.birth_date.as_date())
        .bind(gender_to_column(account.gender))
        .bind(account.enabled)
        .bind(account.locked)
        .bind(account.account_expired)
        .bind(account.credentials_expired)
        .bind(account.version + 1)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some("accounts_username_key")
                {
                    return AccountError::UserExists(account.username.as_str().to_string());
                }
            }
            AccountError::Repository(e.to_string())
        })?;

        account.version += 1;
        Ok(account)
    }

    async fn enable(&self, mut account: Account) -> Result<Account, AccountError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AccountError::Repository(e.to_string()))?;

        let updated = sqlx::query(
            r#"
            UPDATE accounts
            SET enabled = TRUE, version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(account.id.0)
        .bind(account.version)
        .execute(&mut *tx)
        .await
        .map_err(|e| AccountError::Repository(e.to_string()))?;

        if updated.rows_affected() == 0 {
            return Err(AccountError::Conflict(account.id.to_string()));
        }

        sqlx::query("DELETE FROM email_verification_tokens WHERE account_id = $1")
            .bind(account.id.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| AccountError::Repository(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AccountError::Repository(e.to_string()))?;

        account.enabled = true;
        account.version += 1;
        Ok(account)
    }
}

#[async_trait]
impl VerificationTokenStore for PostgresAccountStore {
    async fn find_by_value(
        &self,
        value: Uuid,
    ) -> Result<Option<VerificationToken>, AccountError> {
        let row = sqlx::query(
            "SELECT value, account_id, expires_at FROM email_verification_tokens WHERE value = $1",
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::Repository(e.to_string()))?;

        row.as_ref().map(token_from_row).transpose()
    }

    async fn find_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<VerificationToken>, AccountError> {
        let row = sqlx::query(
            "SELECT value, account_id, expires_at FROM email_verification_tokens \
             WHERE account_id = $1",
        )
        .bind(account_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::Repository(e.to_string()))?;

        row.as_ref().map(token_from_row).transpose()
    }

    async fn upsert(
        &self,
        token: VerificationToken,
    ) -> Result<VerificationToken, AccountError> {
        sqlx::query(
            r#"
            INSERT INTO email_verification_tokens (value, account_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (account_id)
            DO UPDATE SET value = EXCLUDED.value, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(token.value)
        .bind(token.account_id.0)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AccountError::Repository(e.to_string()))?;

        Ok(token)
    }

    async fn delete_for_account(&self, account_id: &AccountId) -> Result<(), AccountError> {
        sqlx::query("DELETE FROM email_verification_tokens WHERE account_id = $1")
            .bind(account_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| AccountError::Repository(e.to_string()))?;

        Ok(())
    }
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, AccountError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| AccountError::Repository(e.to_string()))
}

fn account_from_row(row: &PgRow) -> Result<Account, AccountError> {
    Ok(Account {
        id: AccountId(column(row, "id")?),
        username: Username::new(column(row, "username")?)?,
        password_hash: column(row, "password_hash")?,
        email: EmailAddress::new(column(row, "email")?)?,
        first_name: PersonName::new(column(row, "first_name")?)?,
        last_name: PersonName::new(column(row, "last_name")?)?,
        birth_date: BirthDate::new(column(row, "birth_date")?)?,
        gender: gender_from_column(&column::<String>(row, "gender")?)?,
        enabled: column(row, "enabled")?,
        locked: column(row, "locked")?,
        account_expired: column(row, "account_expired")?,
        credentials_expired: column(row, "credentials_expired")?,
        version: column(row, "version")?,
        created_at: column(row, "created_at")?,
    })
}

fn token_from_row(row: &PgRow) -> Result<VerificationToken, AccountError> {
    Ok(VerificationToken {
        value: column(row, "value")?,
        account_id: AccountId(column(row, "account_id")?),
        expires_at: column(row, "expires_at")?,
    })
}

fn gender_to_column(gender: Gender) -> &'static str {
    match gender {
        Gender::Unspecified => "UNSPECIFIED",
        Gender::Female => "FEMALE",
        Gender::Male => "MALE",
    }
}

fn gender_from_column(value: &str) -> Result<Gender, AccountError> {
    match value {
        "UNSPECIFIED" => Ok(Gender::Unspecified),
        "FEMALE" => Ok(Gender::Female),
        "MALE" => Ok(Gender::Male),
        other => Err(AccountError::Repository(format!(
            "unexpected gender column value: {other}"
        ))),
    }
}
