//! Persistence store — the only query surface over Postgres.
//!
//! ARCHITECTURE
//! ============
//! The rest of the crate never issues raw queries; it calls the named
//! access functions here. All functions are free async fns over `&PgPool`
//! so callers compose them without holding any store object.
//!
//! ERROR HANDLING
//! ==============
//! Not-found lookups are `Ok(None)` or empty collections, never errors.
//! A duplicate-email insert surfaces as `StoreError::DuplicateEmail` so
//! the session controller can swallow exactly that class and nothing else.

use sqlx::{PgPool, Row};
use time::OffsetDateTime;

use crate::state::Notification;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a user with email {0} already exists")]
    DuplicateEmail(String),
    #[error("invalid email: {0:?}")]
    InvalidEmail(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row in `users`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub created_at: OffsetDateTime,
}

/// Row in `reports`. Structural only; report workflows live elsewhere.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Report {
    pub id: i32,
    pub user_id: i32,
    pub location: String,
    pub waste_type: String,
    pub amount: String,
    pub image_url: Option<String>,
}

/// Ledger entry kinds recognized by the balance aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    EarnedReport,
    EarnedCollect,
    Redeemed,
}

impl TransactionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EarnedReport => "earned_report",
            Self::EarnedCollect => "earned_collect",
            Self::Redeemed => "redeemed",
        }
    }

    /// Whether entries of this kind add to the balance.
    #[must_use]
    pub fn is_credit(self) -> bool {
        !matches!(self, Self::Redeemed)
    }
}

// =============================================================================
// EMAIL NORMALIZATION
// =============================================================================

/// Lowercase, trim, and shape-check an email. Returns `None` for values
/// that cannot identify a user.
#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return None;
    }
    let parts = normalized.split('@').collect::<Vec<_>>();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return None;
    }
    Some(normalized)
}

// =============================================================================
// USERS
// =============================================================================

/// Insert a new user. Fails with [`StoreError::DuplicateEmail`] when the
/// email is already taken; the caller decides whether that matters.
pub async fn create_user(pool: &PgPool, email: &str, name: &str) -> Result<User, StoreError> {
    let normalized = normalize_email(email).ok_or_else(|| StoreError::InvalidEmail(email.to_owned()))?;

    let row = sqlx::query(
        r"INSERT INTO users (email, name)
          VALUES ($1, $2)
          RETURNING id, email, name, created_at",
    )
    .bind(&normalized)
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
            StoreError::DuplicateEmail(normalized.clone())
        } else {
            StoreError::Database(e)
        }
    })?;

    Ok(user_from_row(&row))
}

/// Look up a user by email. Unknown or malformed emails are `Ok(None)`.
pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, StoreError> {
    let Some(normalized) = normalize_email(email) else {
        return Ok(None);
    };

    let row = sqlx::query("SELECT id, email, name, created_at FROM users WHERE email = $1")
        .bind(&normalized)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(user_from_row))
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// Unread notifications for a user, newest first.
pub async fn get_unread_notifications(pool: &PgPool, user_id: i32) -> Result<Vec<Notification>, StoreError> {
    let rows = sqlx::query(
        r"SELECT id, user_id, title, message, is_read, created_at
          FROM notifications
          WHERE user_id = $1 AND NOT is_read
          ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|r| Notification {
            id: r.get("id"),
            user_id: r.get("user_id"),
            title: r.get("title"),
            message: r.get("message"),
            is_read: r.get("is_read"),
            created_at: r.get("created_at"),
        })
        .collect())
}

/// Flag a notification as read. Unknown ids are a no-op.
pub async fn mark_notification_as_read(pool: &PgPool, notification_id: i32) -> Result<(), StoreError> {
    sqlx::query("UPDATE notifications SET is_read = true WHERE id = $1")
        .bind(notification_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Insert a notification for a user.
pub async fn create_notification(pool: &PgPool, user_id: i32, title: &str, message: &str) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO notifications (user_id, title, message) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(title)
        .bind(message)
        .execute(pool)
        .await?;
    Ok(())
}

// =============================================================================
// BALANCE
// =============================================================================

/// Current token balance: credits minus redemptions, clamped at zero.
pub async fn get_user_balance(pool: &PgPool, user_id: i32) -> Result<i64, StoreError> {
    let row = sqlx::query(
        r"SELECT GREATEST(
              COALESCE(SUM(CASE WHEN kind = 'redeemed' THEN -amount ELSE amount END), 0),
              0
          ) AS balance
          FROM transactions
          WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(row.get("balance"))
}

/// Append a ledger entry backing the balance aggregate.
pub async fn record_transaction(
    pool: &PgPool,
    user_id: i32,
    kind: TransactionKind,
    amount: i32,
    description: &str,
) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO transactions (user_id, kind, amount, description) VALUES ($1, $2, $3, $4)")
        .bind(user_id)
        .bind(kind.as_str())
        .bind(amount)
        .bind(description)
        .execute(pool)
        .await?;
    Ok(())
}

// =============================================================================
// REPORTS
// =============================================================================

/// Insert a waste report owned by `user_id`. Structural insert only.
pub async fn create_report(
    pool: &PgPool,
    user_id: i32,
    location: &str,
    waste_type: &str,
    amount: &str,
    image_url: Option<&str>,
) -> Result<Report, StoreError> {
    let row = sqlx::query(
        r"INSERT INTO reports (user_id, location, waste_type, amount, image_url)
          VALUES ($1, $2, $3, $4, $5)
          RETURNING id, user_id, location, waste_type, amount, image_url",
    )
    .bind(user_id)
    .bind(location)
    .bind(waste_type)
    .bind(amount)
    .bind(image_url)
    .fetch_one(pool)
    .await?;

    Ok(Report {
        id: row.get("id"),
        user_id: row.get("user_id"),
        location: row.get("location"),
        waste_type: row.get("waste_type"),
        amount: row.get("amount"),
        image_url: row.get("image_url"),
    })
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
