use crate::cursor::CursorData;
use crate::models::{
    CheckIn, CheckInFilter, Course, CreateDiscRequest, Disc, DiscFilter, NewCheckInRequest,
    NewCourse, SortDirection, UpdateCheckInRequest, UpdateDiscRequest,
};
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0} already exists")]
    Conflict(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Other(err.into())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Keyset page over check-ins ordered by `(checked_in_at, id)`
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub limit: i64,
    pub direction: SortDirection,
    /// Last row of the previous page, exclusive
    pub after: Option<CursorData>,
}

impl PageRequest {
    pub fn first(limit: i64, direction: SortDirection) -> Self {
        Self {
            limit,
            direction,
            after: None,
        }
    }

    /// Keyset bound to compare against; open-ended when there is no cursor
    pub(crate) fn bound(&self) -> (i64, i64) {
        match (&self.after, self.direction) {
            (Some(cursor), _) => (cursor.checked_in_at, cursor.id),
            (None, SortDirection::Asc) => (i64::MIN, i64::MIN),
            (None, SortDirection::Desc) => (i64::MAX, i64::MAX),
        }
    }

    pub(crate) fn order_sql(&self) -> (&'static str, &'static str) {
        match self.direction {
            SortDirection::Asc => (">", "ASC"),
            SortDirection::Desc => ("<", "DESC"),
        }
    }
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Create tables and indexes if missing
    async fn init(&self) -> Result<()>;

    async fn create_disc(&self, disc: &CreateDiscRequest) -> StorageResult<Disc>;

    async fn get_disc(&self, id: &str) -> Result<Option<Disc>>;

    async fn list_discs(&self, filter: &DiscFilter, limit: i64, offset: i64) -> Result<Vec<Disc>>;

    /// Returns `None` when no disc has this id
    async fn update_disc(&self, id: &str, update: &UpdateDiscRequest) -> Result<Option<Disc>>;

    /// Delete a disc together with all of its check-ins
    async fn delete_disc(&self, id: &str) -> Result<bool>;

    /// Record a check-in at the current time. `NotFound` if the disc is unknown.
    async fn create_check_in(
        &self,
        disc_id: &str,
        check_in: &NewCheckInRequest,
    ) -> StorageResult<CheckIn>;

    async fn get_check_in(&self, id: i64) -> Result<Option<CheckIn>>;

    async fn list_check_ins(
        &self,
        filter: &CheckInFilter,
        page: &PageRequest,
    ) -> Result<Vec<CheckIn>>;

    async fn list_check_ins_for_disc(
        &self,
        disc_id: &str,
        page: &PageRequest,
    ) -> Result<Vec<CheckIn>>;

    async fn list_check_ins_for_user(
        &self,
        username: &str,
        page: &PageRequest,
    ) -> Result<Vec<CheckIn>>;

    /// Every check-in of a disc, oldest first (ties broken by id).
    /// `NotFound` if the disc is unknown; a known disc may have an empty log.
    async fn travel_log(&self, disc_id: &str) -> StorageResult<Vec<CheckIn>>;

    async fn update_check_in(
        &self,
        id: i64,
        update: &UpdateCheckInRequest,
    ) -> Result<Option<CheckIn>>;

    async fn delete_check_in(&self, id: i64) -> Result<bool>;

    async fn add_course(&self, course: &NewCourse) -> Result<Course>;

    async fn list_courses(
        &self,
        course_name: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Course>>;
}

/// `%term%` for substring matching, or `None` to match everything
pub(crate) fn like_pattern(term: Option<&str>) -> Option<String> {
    term.filter(|t| !t.is_empty()).map(|t| format!("%{t}%"))
}

pub(crate) fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
