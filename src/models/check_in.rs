use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A disc recorded at a course.
///
/// Coordinates are kept as text exactly as they were stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub id: i64,
    pub disc_id: String,
    pub username: Option<String>,
    pub course_name: String,
    pub city: Option<String>,
    pub state: String,
    pub zip: Option<String>,
    pub country: String,
    pub latitude: String,
    pub longitude: String,
    pub note: Option<String>,
    pub checked_in_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCheckInRequest {
    pub username: Option<String>,
    pub course_name: String,
    pub city: Option<String>,
    pub state: String,
    pub zip: Option<String>,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCheckInRequest {
    pub course_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub note: Option<String>,
}

/// Ordering of check-in listings by check-in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Read a `direction` query value; anything other than asc/desc falls back to `default`
    pub fn from_param(raw: Option<&str>, default: Self) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            Some(v) if v.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => default,
        }
    }
}

/// Substring filters for the global check-in listing
#[derive(Debug, Clone, Default)]
pub struct CheckInFilter {
    pub course_name: Option<String>,
    pub username: Option<String>,
}
