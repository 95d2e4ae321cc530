use crate::models::{
    CheckIn, CheckInFilter, Course, CreateDiscRequest, Disc, DiscFilter, NewCheckInRequest,
    NewCourse, UpdateCheckInRequest, UpdateDiscRequest,
};
use crate::storage::trait_def::{like_pattern, now_unix};
use crate::storage::{PageRequest, Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

const CHECK_IN_COLUMNS: &str = "id, disc_id, username, course_name, city, state, zip, country, \
                                latitude, longitude, note, checked_in_at";

pub struct PostgresStorage {
    pool: Arc<PgPool>,
}

impl PostgresStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn disc_exists(&self, disc_id: &str) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM discs WHERE id = $1")
            .bind(disc_id)
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS discs (
                id TEXT PRIMARY KEY,
                manufacturer TEXT NOT NULL,
                plastic TEXT NOT NULL,
                name TEXT NOT NULL,
                img_url TEXT
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS check_ins (
                id BIGSERIAL PRIMARY KEY,
                disc_id TEXT NOT NULL REFERENCES discs(id) ON DELETE CASCADE,
                username TEXT,
                course_name TEXT NOT NULL,
                city TEXT,
                state TEXT NOT NULL,
                zip TEXT,
                country TEXT NOT NULL,
                latitude TEXT NOT NULL,
                longitude TEXT NOT NULL,
                note TEXT,
                checked_in_at BIGINT NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_check_ins_disc ON check_ins(disc_id, checked_in_at, id)",
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_check_ins_user ON check_ins(username, checked_in_at, id)",
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS courses (
                id BIGSERIAL PRIMARY KEY,
                course_name TEXT NOT NULL,
                city TEXT,
                state TEXT,
                zip TEXT,
                country TEXT,
                holes INTEGER
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn create_disc(&self, disc: &CreateDiscRequest) -> StorageResult<Disc> {
        let row = sqlx::query_as::<_, Disc>(
            r#"
            INSERT INTO discs (id, manufacturer, plastic, name, img_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            RETURNING id, manufacturer, plastic, name, img_url
            "#,
        )
        .bind(&disc.id)
        .bind(&disc.manufacturer)
        .bind(&disc.plastic)
        .bind(&disc.name)
        .bind(&disc.img_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.ok_or_else(|| StorageError::Conflict(format!("disc {}", disc.id)))
    }

    async fn get_disc(&self, id: &str) -> Result<Option<Disc>> {
        let disc = sqlx::query_as::<_, Disc>(
            "SELECT id, manufacturer, plastic, name, img_url FROM discs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(disc)
    }

    async fn list_discs(&self, filter: &DiscFilter, limit: i64, offset: i64) -> Result<Vec<Disc>> {
        let discs = sqlx::query_as::<_, Disc>(
            r#"
            SELECT id, manufacturer, plastic, name, img_url
            FROM discs
            WHERE ($1::TEXT IS NULL OR name ILIKE $1)
              AND ($2::TEXT IS NULL OR manufacturer ILIKE $2)
              AND ($3::TEXT IS NULL OR plastic ILIKE $3)
            ORDER BY id ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(like_pattern(filter.name.as_deref()))
        .bind(like_pattern(filter.manufacturer.as_deref()))
        .bind(like_pattern(filter.plastic.as_deref()))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(discs)
    }

    async fn update_disc(&self, id: &str, update: &UpdateDiscRequest) -> Result<Option<Disc>> {
        let disc = sqlx::query_as::<_, Disc>(
            r#"
            UPDATE discs
            SET manufacturer = COALESCE($1, manufacturer),
                plastic = COALESCE($2, plastic),
                name = COALESCE($3, name),
                img_url = COALESCE($4, img_url)
            WHERE id = $5
            RETURNING id, manufacturer, plastic, name, img_url
            "#,
        )
        .bind(&update.manufacturer)
        .bind(&update.plastic)
        .bind(&update.name)
        .bind(&update.img_url)
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(disc)
    }

    async fn delete_disc(&self, id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM check_ins WHERE disc_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM discs WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_check_in(
        &self,
        disc_id: &str,
        check_in: &NewCheckInRequest,
    ) -> StorageResult<CheckIn> {
        if !self.disc_exists(disc_id).await? {
            return Err(StorageError::NotFound(format!("disc {disc_id}")));
        }

        let sql = format!(
            r#"
            INSERT INTO check_ins
                (disc_id, username, course_name, city, state, zip, country,
                 latitude, longitude, note, checked_in_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {CHECK_IN_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, CheckIn>(&sql)
            .bind(disc_id)
            .bind(&check_in.username)
            .bind(&check_in.course_name)
            .bind(&check_in.city)
            .bind(&check_in.state)
            .bind(&check_in.zip)
            .bind(&check_in.country)
            .bind(check_in.latitude.to_string())
            .bind(check_in.longitude.to_string())
            .bind(&check_in.note)
            .bind(now_unix())
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row)
    }

    async fn get_check_in(&self, id: i64) -> Result<Option<CheckIn>> {
        let sql = format!("SELECT {CHECK_IN_COLUMNS} FROM check_ins WHERE id = $1");
        let check_in = sqlx::query_as::<_, CheckIn>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(check_in)
    }

    async fn list_check_ins(
        &self,
        filter: &CheckInFilter,
        page: &PageRequest,
    ) -> Result<Vec<CheckIn>> {
        let (cmp, dir) = page.order_sql();
        let (bound_at, bound_id) = page.bound();

        let sql = format!(
            r#"
            SELECT {CHECK_IN_COLUMNS}
            FROM check_ins
            WHERE ($1::TEXT IS NULL OR course_name ILIKE $1)
              AND ($2::TEXT IS NULL OR username ILIKE $2)
              AND (checked_in_at, id) {cmp} ($3, $4)
            ORDER BY checked_in_at {dir}, id {dir}
            LIMIT $5
            "#
        );

        let check_ins = sqlx::query_as::<_, CheckIn>(&sql)
            .bind(like_pattern(filter.course_name.as_deref()))
            .bind(like_pattern(filter.username.as_deref()))
            .bind(bound_at)
            .bind(bound_id)
            .bind(page.limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(check_ins)
    }

    async fn list_check_ins_for_disc(
        &self,
        disc_id: &str,
        page: &PageRequest,
    ) -> Result<Vec<CheckIn>> {
        let (cmp, dir) = page.order_sql();
        let (bound_at, bound_id) = page.bound();

        let sql = format!(
            r#"
            SELECT {CHECK_IN_COLUMNS}
            FROM check_ins
            WHERE disc_id = $1
              AND (checked_in_at, id) {cmp} ($2, $3)
            ORDER BY checked_in_at {dir}, id {dir}
            LIMIT $4
            "#
        );

        let check_ins = sqlx::query_as::<_, CheckIn>(&sql)
            .bind(disc_id)
            .bind(bound_at)
            .bind(bound_id)
            .bind(page.limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(check_ins)
    }

    async fn list_check_ins_for_user(
        &self,
        username: &str,
        page: &PageRequest,
    ) -> Result<Vec<CheckIn>> {
        let (cmp, dir) = page.order_sql();
        let (bound_at, bound_id) = page.bound();

        let sql = format!(
            r#"
            SELECT {CHECK_IN_COLUMNS}
            FROM check_ins
            WHERE username = $1
              AND (checked_in_at, id) {cmp} ($2, $3)
            ORDER BY checked_in_at {dir}, id {dir}
            LIMIT $4
            "#
        );

        let check_ins = sqlx::query_as::<_, CheckIn>(&sql)
            .bind(username)
            .bind(bound_at)
            .bind(bound_id)
            .bind(page.limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(check_ins)
    }

    async fn travel_log(&self, disc_id: &str) -> StorageResult<Vec<CheckIn>> {
        if !self.disc_exists(disc_id).await? {
            return Err(StorageError::NotFound(format!("disc {disc_id}")));
        }

        let sql = format!(
            "SELECT {CHECK_IN_COLUMNS} FROM check_ins WHERE disc_id = $1 \
             ORDER BY checked_in_at ASC, id ASC"
        );
        let log = sqlx::query_as::<_, CheckIn>(&sql)
            .bind(disc_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(log)
    }

    async fn update_check_in(
        &self,
        id: i64,
        update: &UpdateCheckInRequest,
    ) -> Result<Option<CheckIn>> {
        let sql = format!(
            r#"
            UPDATE check_ins
            SET course_name = COALESCE($1, course_name),
                city = COALESCE($2, city),
                state = COALESCE($3, state),
                zip = COALESCE($4, zip),
                country = COALESCE($5, country),
                latitude = COALESCE($6, latitude),
                longitude = COALESCE($7, longitude),
                note = COALESCE($8, note)
            WHERE id = $9
            RETURNING {CHECK_IN_COLUMNS}
            "#
        );
        let check_in = sqlx::query_as::<_, CheckIn>(&sql)
            .bind(&update.course_name)
            .bind(&update.city)
            .bind(&update.state)
            .bind(&update.zip)
            .bind(&update.country)
            .bind(update.latitude.map(|v| v.to_string()))
            .bind(update.longitude.map(|v| v.to_string()))
            .bind(&update.note)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(check_in)
    }

    async fn delete_check_in(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM check_ins WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_course(&self, course: &NewCourse) -> Result<Course> {
        let row = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (course_name, city, state, zip, country, holes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, course_name, city, state, zip, country, holes
            "#,
        )
        .bind(&course.course_name)
        .bind(&course.city)
        .bind(&course.state)
        .bind(&course.zip)
        .bind(&course.country)
        .bind(course.holes)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn list_courses(
        &self,
        course_name: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, course_name, city, state, zip, country, holes
            FROM courses
            WHERE ($1::TEXT IS NULL OR course_name ILIKE $1)
            ORDER BY course_name ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(like_pattern(course_name))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(courses)
    }
}
