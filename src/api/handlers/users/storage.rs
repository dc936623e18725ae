//! Database helpers for the account workflows.
//!
//! Each workflow is one transaction: registration inserts the account and
//! its confirmation code together; confirmation locks the pending account,
//! consumes the code, and activates the account; token issuance is a single
//! atomic upsert.

use anyhow::{Context, Result, anyhow};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::utils::{generate_confirmation_code, generate_session_token, is_unique_violation};

/// Outcome when attempting to create a new account + confirmation code.
#[derive(Debug)]
pub(super) enum RegisterOutcome {
    Created { code: String },
    Conflict,
}

/// Outcome of a confirmation attempt.
#[derive(Debug)]
pub(super) enum ConfirmOutcome {
    Confirmed,
    /// The account is pending but the supplied code matched nothing; the
    /// stored code survives so the caller may retry.
    WrongCode,
    /// No pending account with that username (never registered or already
    /// confirmed - intentionally indistinguishable).
    NotFound,
}

/// Fields needed to authenticate a login request.
pub(super) struct AccountRecord {
    pub(super) id: Uuid,
    pub(super) username: String,
    pub(super) password_hash: String,
    pub(super) active: bool,
}

/// Insert an inactive account and its confirmation code atomically.
pub(super) async fn create_account(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
) -> Result<RegisterOutcome> {
    let mut tx = pool.begin().await.context("begin register transaction")?;

    let query = r"
        INSERT INTO users (username, password_hash)
        VALUES ($1, $2)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(username)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .instrument(span)
        .await;

    let user_id: Uuid = match row {
        Ok(row) => row.get("id"),
        Err(err) => {
            if is_unique_violation(&err) {
                let _ = tx.rollback().await;
                return Ok(RegisterOutcome::Conflict);
            }
            return Err(err).context("failed to insert user");
        }
    };

    let code = generate_confirmation_code();

    let query = r"
        INSERT INTO confirmation_codes (user_id, code)
        VALUES ($1, $2)
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .bind(&code)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to insert confirmation code")?;

    tx.commit().await.context("commit register transaction")?;

    Ok(RegisterOutcome::Created { code })
}

/// Consume a confirmation code and activate the pending account.
///
/// The pending row is locked so two concurrent confirmations with the same
/// code have exactly one winner; the loser no longer sees a pending account
/// and reports `NotFound`.
pub(super) async fn confirm_account(
    pool: &PgPool,
    username: &str,
    code: &str,
) -> Result<ConfirmOutcome> {
    let mut tx = pool.begin().await.context("begin confirm transaction")?;

    let query = r"
        SELECT id FROM users
        WHERE username = $1 AND NOT active
        FOR UPDATE
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(username)
        .fetch_optional(&mut *tx)
        .instrument(span)
        .await
        .context("failed to lookup pending account")?;

    let Some(row) = row else {
        let _ = tx.rollback().await;
        return Ok(ConfirmOutcome::NotFound);
    };
    let user_id: Uuid = row.get("id");

    let query = r"
        DELETE FROM confirmation_codes
        WHERE user_id = $1 AND code = $2
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let deleted = sqlx::query(query)
        .bind(user_id)
        .bind(code)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to consume confirmation code")?;

    if deleted.rows_affected() == 0 {
        let _ = tx.rollback().await;
        return Ok(ConfirmOutcome::WrongCode);
    }

    let query = "UPDATE users SET active = TRUE WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to activate account")?;

    tx.commit().await.context("commit confirm transaction")?;

    Ok(ConfirmOutcome::Confirmed)
}

/// Look up an account by exact username.
pub(super) async fn lookup_account(pool: &PgPool, username: &str) -> Result<Option<AccountRecord>> {
    let query = r"
        SELECT id, username, password_hash, active FROM users
        WHERE username = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(username)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup account")?;

    Ok(row.map(|row| AccountRecord {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        active: row.get("active"),
    }))
}

/// Get-or-create the account's session token.
///
/// The upsert keeps the existing value, so repeated logins return the same
/// token. The retry guards the (vanishingly unlikely) global token
/// collision.
pub(super) async fn issue_session_token(pool: &PgPool, user_id: Uuid) -> Result<String> {
    let query = r"
        INSERT INTO auth_tokens (user_id, token)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET token = auth_tokens.token
        RETURNING token
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );

    for _ in 0..3 {
        let token = generate_session_token()?;
        let result = sqlx::query(query)
            .bind(user_id)
            .bind(&token)
            .fetch_one(pool)
            .instrument(span.clone())
            .await;

        match result {
            Ok(row) => return Ok(row.get("token")),
            Err(err) if is_unique_violation(&err) => continue,
            Err(err) => return Err(err).context("failed to issue session token"),
        }
    }

    Err(anyhow!("failed to issue session token after retries"))
}
