//! Postgres-backed user directory.
//!
//! ## Query shape
//!
//! Every read goes through the same join:
//!
//! ```sql
//! FROM users u
//! LEFT JOIN userinfo    i ON u.username = i.username
//! LEFT JOIN authorities a ON u.username = a.username
//! ```
//!
//! `authorities.username` is the table's primary key, so the join yields at
//! most one row per account and paging never sees duplicates.
//!
//! ## Consistency
//!
//! A listing issues a `COUNT(*)` and then the page `SELECT` as two separate
//! statements. A concurrent insert between them can leave `totalElements`
//! one behind the page contents; this is accepted.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | DirectoryError |
//! |------------|----------------------|----------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Storage` |
//! | RowNotFound | N/A | `NotFound` |
//! | Other | N/A | `Storage` |

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use userhub_core::{Page, PageQuery, PageWindow, Username};

use super::filter::{UserFilter, escape_like};
use super::model::{NewAccount, UserProfile, UserRecord};
use super::{DirectoryError, UserDirectory};

/// Embedded migrations for the three directory tables.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const SELECT_COLUMNS: &str = r#"
    SELECT
        u.username,
        u.enabled,
        a.authority,
        i.full_name,
        i.picture,
        i.email,
        i.email_verified,
        i.gender,
        i.birthdate,
        i.phone_number,
        i.phone_number_verified,
        i.address,
        i.position,
        i.department,
        i.note,
        i.created_at,
        i.updated_at
"#;

const FROM_JOIN: &str = r#"
    FROM users u
    LEFT JOIN userinfo i ON u.username = i.username
    LEFT JOIN authorities a ON u.username = a.username
"#;

/// Postgres-backed `UserDirectory`.
///
/// `Send + Sync`; the SQLx pool handles connection sharing.
#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    pool: Arc<PgPool>,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, DirectoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply pending migrations; already-applied ones are skipped.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), DirectoryError> {
        MIGRATOR
            .run(&*self.pool)
            .await
            .map_err(|e| DirectoryError::Storage(format!("migration failed: {e}")))
    }

    async fn count_matching(&self, filter: &UserFilter<'_>) -> Result<u64, DirectoryError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        qb.push(FROM_JOIN);
        filter.push_where(&mut qb);

        let total: i64 = qb
            .build_query_scalar()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_users", e))?;

        Ok(total.max(0) as u64)
    }
}

#[async_trait::async_trait]
impl UserDirectory for PostgresUserDirectory {
    #[instrument(
        skip(self, query),
        fields(
            page_no = query.page_no,
            page_size = query.page_size,
            filtered = !UserFilter::from_query(query).is_empty()
        ),
        err
    )]
    async fn list_users(&self, query: &PageQuery) -> Result<Page<UserRecord>, DirectoryError> {
        query.validate()?;
        let filter = UserFilter::from_query(query);

        let total = self.count_matching(&filter).await?;
        let window = PageWindow::clamp(query.page_no, query.page_size, total)?;

        let mut qb = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
        qb.push(FROM_JOIN);
        filter.push_where(&mut qb);
        qb.push(" ORDER BY u.username ASC LIMIT ");
        qb.push_bind(window.limit());
        qb.push(" OFFSET ");
        qb.push_bind(window.offset());

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            let row = UserRow::from_row(&row).map_err(|e| map_sqlx_error("decode_user", e))?;
            users.push(row.try_into()?);
        }

        Ok(Page::new(users, window))
    }

    #[instrument(skip(self, username), fields(username = %username), err)]
    async fn get_user(&self, username: &Username) -> Result<UserRecord, DirectoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
        qb.push(FROM_JOIN);
        qb.push(" WHERE u.username = ");
        qb.push_bind(username.as_str().to_string());
        qb.push(" LIMIT 1");

        let row = qb
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?
            .ok_or_else(|| DirectoryError::NotFound(username.to_string()))?;

        UserRow::from_row(&row)
            .map_err(|e| map_sqlx_error("decode_user", e))?
            .try_into()
    }

    #[instrument(skip(self), err)]
    async fn count_usernames_with_prefix(&self, prefix: &str) -> Result<u64, DirectoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username LIKE $1")
            .bind(format!("{}%", escape_like(prefix)))
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_usernames_with_prefix", e))?;

        Ok(total.max(0) as u64)
    }

    #[instrument(skip(self, account), fields(username = %account.username), err)]
    async fn insert_account(&self, account: NewAccount) -> Result<(), DirectoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_insert_account", e))?;

        sqlx::query("INSERT INTO users (username, password, enabled) VALUES ($1, $2, TRUE)")
            .bind(account.username.as_str())
            .bind(&account.password_hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_user", e))?;

        sqlx::query("INSERT INTO authorities (username, authority) VALUES ($1, $2)")
            .bind(account.username.as_str())
            .bind(&account.authority)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_authority", e))?;

        let p = &account.profile;
        sqlx::query(
            r#"
            INSERT INTO userinfo (
                username, full_name, picture, email, email_verified, gender,
                birthdate, phone_number, phone_number_verified, address,
                position, department, note, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
            "#,
        )
        .bind(account.username.as_str())
        .bind(&p.full_name)
        .bind(&p.picture)
        .bind(&p.email)
        .bind(p.email_verified)
        .bind(&p.gender)
        .bind(p.birthdate)
        .bind(&p.phone_number)
        .bind(p.phone_number_verified)
        .bind(&p.address)
        .bind(&p.position)
        .bind(&p.department)
        .bind(&p.note)
        .bind(account.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_userinfo", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_insert_account", e))?;
        Ok(())
    }

    #[instrument(skip(self, username, update), fields(username = %username), err)]
    async fn update_profile(
        &self,
        username: &Username,
        update: &UserProfile,
        updated_at: DateTime<Utc>,
    ) -> Result<(), DirectoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_update_profile", e))?;

        let exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM users WHERE username = $1")
            .bind(username.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lookup_user", e))?;
        if exists.is_none() {
            return Err(DirectoryError::NotFound(username.to_string()));
        }

        // Upsert: accounts created elsewhere may not have a profile row yet.
        sqlx::query(
            r#"
            INSERT INTO userinfo (
                username, full_name, picture, email, email_verified, gender,
                birthdate, phone_number, phone_number_verified, address,
                position, department, note, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
            ON CONFLICT (username) DO UPDATE SET
                full_name = COALESCE(EXCLUDED.full_name, userinfo.full_name),
                picture = COALESCE(EXCLUDED.picture, userinfo.picture),
                email = COALESCE(EXCLUDED.email, userinfo.email),
                email_verified = COALESCE(EXCLUDED.email_verified, userinfo.email_verified),
                gender = COALESCE(EXCLUDED.gender, userinfo.gender),
                birthdate = COALESCE(EXCLUDED.birthdate, userinfo.birthdate),
                phone_number = COALESCE(EXCLUDED.phone_number, userinfo.phone_number),
                phone_number_verified = COALESCE(EXCLUDED.phone_number_verified, userinfo.phone_number_verified),
                address = COALESCE(EXCLUDED.address, userinfo.address),
                position = COALESCE(EXCLUDED.position, userinfo.position),
                department = COALESCE(EXCLUDED.department, userinfo.department),
                note = COALESCE(EXCLUDED.note, userinfo.note),
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(username.as_str())
        .bind(&update.full_name)
        .bind(&update.picture)
        .bind(&update.email)
        .bind(update.email_verified)
        .bind(&update.gender)
        .bind(update.birthdate)
        .bind(&update.phone_number)
        .bind(update.phone_number_verified)
        .bind(&update.address)
        .bind(&update.position)
        .bind(&update.department)
        .bind(&update.note)
        .bind(updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_userinfo", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_update_profile", e))?;
        Ok(())
    }

    #[instrument(skip(self, username), fields(username = %username), err)]
    async fn set_enabled(&self, username: &Username, enabled: bool) -> Result<(), DirectoryError> {
        let result = sqlx::query("UPDATE users SET enabled = $2 WHERE username = $1")
            .bind(username.as_str())
            .bind(enabled)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_enabled", e))?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::NotFound(username.to_string()));
        }
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> DirectoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => DirectoryError::Conflict(msg),
                _ => DirectoryError::Storage(msg),
            }
        }
        sqlx::Error::RowNotFound => DirectoryError::NotFound(format!("no row in {operation}")),
        sqlx::Error::PoolClosed => {
            DirectoryError::Storage(format!("connection pool closed in {operation}"))
        }
        _ => DirectoryError::Storage(format!("sqlx error in {}: {}", operation, err)),
    }
}

// SQLx row types

#[derive(Debug)]
struct UserRow {
    username: String,
    enabled: bool,
    authority: Option<String>,
    full_name: Option<String>,
    picture: Option<String>,
    email: Option<String>,
    email_verified: Option<bool>,
    gender: Option<String>,
    birthdate: Option<NaiveDate>,
    phone_number: Option<String>,
    phone_number_verified: Option<bool>,
    address: Option<String>,
    position: Option<String>,
    department: Option<String>,
    note: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            username: row.try_get("username")?,
            enabled: row.try_get("enabled")?,
            authority: row.try_get("authority")?,
            full_name: row.try_get("full_name")?,
            picture: row.try_get("picture")?,
            email: row.try_get("email")?,
            email_verified: row.try_get("email_verified")?,
            gender: row.try_get("gender")?,
            birthdate: row.try_get("birthdate")?,
            phone_number: row.try_get("phone_number")?,
            phone_number_verified: row.try_get("phone_number_verified")?,
            address: row.try_get("address")?,
            position: row.try_get("position")?,
            department: row.try_get("department")?,
            note: row.try_get("note")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<UserRow> for UserRecord {
    type Error = DirectoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::new(row.username)
            .map_err(|e| DirectoryError::Storage(format!("stored username is invalid: {e}")))?;

        Ok(UserRecord {
            username,
            enabled: row.enabled,
            authority: row.authority,
            profile: UserProfile {
                full_name: row.full_name,
                picture: row.picture,
                email: row.email,
                email_verified: row.email_verified,
                gender: row.gender,
                birthdate: row.birthdate,
                phone_number: row.phone_number,
                phone_number_verified: row.phone_number_verified,
                address: row.address,
                position: row.position,
                department: row.department,
                note: row.note,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
