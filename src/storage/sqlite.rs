use crate::models::{
    CheckIn, CheckInFilter, Course, CreateDiscRequest, Disc, DiscFilter, NewCheckInRequest,
    NewCourse, UpdateCheckInRequest, UpdateDiscRequest,
};
use crate::storage::trait_def::{like_pattern, now_unix};
use crate::storage::{PageRequest, Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

const CHECK_IN_COLUMNS: &str = "id, disc_id, username, course_name, city, state, zip, country, \
                                latitude, longitude, note, checked_in_at";

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if database_url.contains(":memory:") {
            // An in-memory database lives only as long as its connection
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn disc_exists(&self, disc_id: &str) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM discs WHERE id = ?")
            .bind(disc_id)
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl Storage for SqliteStorage {
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
                id INTEGER PRIMARY KEY AUTOINCREMENT,
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
                checked_in_at INTEGER NOT NULL
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
                id INTEGER PRIMARY KEY AUTOINCREMENT,
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
        let result = sqlx::query(
            r#"
            INSERT INTO discs (id, manufacturer, plastic, name, img_url)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&disc.id)
        .bind(&disc.manufacturer)
        .bind(&disc.plastic)
        .bind(&disc.name)
        .bind(&disc.img_url)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Conflict(format!("disc {}", disc.id)));
        }

        Ok(Disc {
            id: disc.id.clone(),
            manufacturer: disc.manufacturer.clone(),
            plastic: disc.plastic.clone(),
            name: disc.name.clone(),
            img_url: disc.img_url.clone(),
        })
    }

    async fn get_disc(&self, id: &str) -> Result<Option<Disc>> {
        let disc = sqlx::query_as::<_, Disc>(
            "SELECT id, manufacturer, plastic, name, img_url FROM discs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(disc)
    }

    async fn list_discs(&self, filter: &DiscFilter, limit: i64, offset: i64) -> Result<Vec<Disc>> {
        let name = like_pattern(filter.name.as_deref());
        let manufacturer = like_pattern(filter.manufacturer.as_deref());
        let plastic = like_pattern(filter.plastic.as_deref());

        let discs = sqlx::query_as::<_, Disc>(
            r#"
            SELECT id, manufacturer, plastic, name, img_url
            FROM discs
            WHERE (? IS NULL OR name LIKE ?)
              AND (? IS NULL OR manufacturer LIKE ?)
              AND (? IS NULL OR plastic LIKE ?)
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&name)
        .bind(&name)
        .bind(&manufacturer)
        .bind(&manufacturer)
        .bind(&plastic)
        .bind(&plastic)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(discs)
    }

    async fn update_disc(&self, id: &str, update: &UpdateDiscRequest) -> Result<Option<Disc>> {
        let result = sqlx::query(
            r#"
            UPDATE discs
            SET manufacturer = COALESCE(?, manufacturer),
                plastic = COALESCE(?, plastic),
                name = COALESCE(?, name),
                img_url = COALESCE(?, img_url)
            WHERE id = ?
            "#,
        )
        .bind(&update.manufacturer)
        .bind(&update.plastic)
        .bind(&update.name)
        .bind(&update.img_url)
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_disc(id).await
    }

    async fn delete_disc(&self, id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM check_ins WHERE disc_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM discs WHERE id = ?")
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

        let result = sqlx::query(
            r#"
            INSERT INTO check_ins
                (disc_id, username, course_name, city, state, zip, country,
                 latitude, longitude, note, checked_in_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
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
        .execute(self.pool.as_ref())
        .await?;

        let id = result.last_insert_rowid();
        self.get_check_in(id)
            .await?
            .ok_or_else(|| StorageError::Other(anyhow::anyhow!("check in {id} vanished after insert")))
    }

    async fn get_check_in(&self, id: i64) -> Result<Option<CheckIn>> {
        let sql = format!("SELECT {CHECK_IN_COLUMNS} FROM check_ins WHERE id = ?");
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
        let course_name = like_pattern(filter.course_name.as_deref());
        let username = like_pattern(filter.username.as_deref());
        let (cmp, dir) = page.order_sql();
        let (bound_at, bound_id) = page.bound();

        let sql = format!(
            r#"
            SELECT {CHECK_IN_COLUMNS}
            FROM check_ins
            WHERE (? IS NULL OR course_name LIKE ?)
              AND (? IS NULL OR username LIKE ?)
              AND (checked_in_at, id) {cmp} (?, ?)
            ORDER BY checked_in_at {dir}, id {dir}
            LIMIT ?
            "#
        );

        let check_ins = sqlx::query_as::<_, CheckIn>(&sql)
            .bind(&course_name)
            .bind(&course_name)
            .bind(&username)
            .bind(&username)
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
            WHERE disc_id = ?
              AND (checked_in_at, id) {cmp} (?, ?)
            ORDER BY checked_in_at {dir}, id {dir}
            LIMIT ?
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
            WHERE username = ?
              AND (checked_in_at, id) {cmp} (?, ?)
            ORDER BY checked_in_at {dir}, id {dir}
            LIMIT ?
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
            "SELECT {CHECK_IN_COLUMNS} FROM check_ins WHERE disc_id = ? \
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
            SET course_name = COALESCE(?, course_name),
                city = COALESCE(?, city),
                state = COALESCE(?, state),
                zip = COALESCE(?, zip),
                country = COALESCE(?, country),
                latitude = COALESCE(?, latitude),
                longitude = COALESCE(?, longitude),
                note = COALESCE(?, note)
            WHERE id = ?
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
        let result = sqlx::query("DELETE FROM check_ins WHERE id = ?")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_course(&self, course: &NewCourse) -> Result<Course> {
        let result = sqlx::query(
            r#"
            INSERT INTO courses (course_name, city, state, zip, country, holes)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&course.course_name)
        .bind(&course.city)
        .bind(&course.state)
        .bind(&course.zip)
        .bind(&course.country)
        .bind(course.holes)
        .execute(self.pool.as_ref())
        .await?;

        Ok(Course {
            id: result.last_insert_rowid(),
            course_name: course.course_name.clone(),
            city: course.city.clone(),
            state: course.state.clone(),
            zip: course.zip.clone(),
            country: course.country.clone(),
            holes: course.holes,
        })
    }

    async fn list_courses(
        &self,
        course_name: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Course>> {
        let pattern = like_pattern(course_name);

        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, course_name, city, state, zip, country, holes
            FROM courses
            WHERE (? IS NULL OR course_name LIKE ?)
            ORDER BY course_name ASC, id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(courses)
    }
}
