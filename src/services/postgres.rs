use crate::config::DatabaseSettings;
use crate::models::{NewUser, User, UserId};
use crate::services::{StoreError, UserStore};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgConnection, PgPool, Row};
use std::time::Duration;

// Skill lists are aggregated per user in the same statement as the user
// row, so a listing reads one snapshot.
const SELECT_USERS: &str = r#"
    SELECT
        u.user_id,
        u.name,
        u.email,
        u.location,
        u.bio,
        u.created_at,
        ARRAY(
            SELECT o.skill FROM skills_offered o
            WHERE o.user_id = u.user_id
            ORDER BY o.position
        ) AS skills_offered,
        ARRAY(
            SELECT n.skill FROM skills_needed n
            WHERE n.user_id = u.user_id
            ORDER BY n.position
        ) AS skills_needed
    FROM users u
"#;

/// Which skill table to write
#[derive(Debug, Clone, Copy)]
enum SkillTable {
    Offered,
    Needed,
}

impl SkillTable {
    fn name(self) -> &'static str {
        match self {
            SkillTable::Offered => "skills_offered",
            SkillTable::Needed => "skills_needed",
        }
    }
}

/// PostgreSQL-backed user store
///
/// A user row and its skill rows are written in one transaction, so readers
/// never see a user without its skills.
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Create a new store from a connection string and run migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        tracing::info!(
            "Connecting to PostgreSQL (max: {} connections)",
            settings.max_connections
        );

        Self::new(
            &settings.url,
            settings.max_connections,
            settings.min_connections,
            Duration::from_secs(settings.acquire_timeout_secs),
            Duration::from_secs(settings.idle_timeout_secs),
        )
        .await
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (name, email, location, bio, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING user_id, created_at
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.location)
        .bind(&new_user.bio)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_violation(e, &new_user.email))?;

        let user_id: UserId = row.try_get("user_id")?;
        let created_at = row.try_get("created_at")?;

        insert_skills(&mut tx, SkillTable::Offered, user_id, &new_user.skills_offered).await?;
        insert_skills(&mut tx, SkillTable::Needed, user_id, &new_user.skills_needed).await?;

        tx.commit().await?;

        tracing::debug!("Stored user {} in PostgreSQL", user_id);
        Ok(User::from_new(user_id, new_user, created_at))
    }

    async fn replace_user(&self, user_id: UserId, new_user: NewUser) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, location = $4, bio = $5
            WHERE user_id = $1
            RETURNING created_at
            "#,
        )
        .bind(user_id)
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.location)
        .bind(&new_user.bio)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| unique_violation(e, &new_user.email))?
        .ok_or(StoreError::NotFound(user_id))?;

        let created_at = row.try_get("created_at")?;

        for table in [SkillTable::Offered, SkillTable::Needed] {
            let query = format!("DELETE FROM {} WHERE user_id = $1", table.name());
            sqlx::query(&query).bind(user_id).execute(&mut *tx).await?;
        }

        insert_skills(&mut tx, SkillTable::Offered, user_id, &new_user.skills_offered).await?;
        insert_skills(&mut tx, SkillTable::Needed, user_id, &new_user.skills_needed).await?;

        tx.commit().await?;

        Ok(User::from_new(user_id, new_user, created_at))
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        let query = format!("{} WHERE u.user_id = $1", SELECT_USERS);

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose().map_err(Into::into)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let query = format!("{} ORDER BY u.user_id", SELECT_USERS);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let users = rows
            .iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} users from PostgreSQL", users.len());
        Ok(users)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

async fn insert_skills(
    conn: &mut PgConnection,
    table: SkillTable,
    user_id: UserId,
    skills: &[String],
) -> Result<(), StoreError> {
    let query = format!(
        "INSERT INTO {} (user_id, position, skill) VALUES ($1, $2, $3) \
         ON CONFLICT (user_id, skill) DO NOTHING",
        table.name()
    );

    for (position, skill) in skills.iter().enumerate() {
        sqlx::query(&query)
            .bind(user_id)
            .bind(position as i32)
            .bind(skill)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        skills_offered: row.try_get("skills_offered")?,
        skills_needed: row.try_get("skills_needed")?,
        location: row.try_get("location")?,
        bio: row.try_get("bio")?,
        created_at: row.try_get("created_at")?,
    })
}

fn unique_violation(err: sqlx::Error, email: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateEmail(email.to_string());
        }
    }
    err.into()
}
