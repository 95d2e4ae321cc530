use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A tracked disc, identified by the code printed on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Disc {
    pub id: String,
    pub manufacturer: String,
    pub plastic: String,
    pub name: String,
    pub img_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiscRequest {
    pub id: String,
    pub manufacturer: String,
    pub plastic: String,
    pub name: String,
    pub img_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDiscRequest {
    pub manufacturer: Option<String>,
    pub plastic: Option<String>,
    pub name: Option<String>,
    pub img_url: Option<String>,
}

impl UpdateDiscRequest {
    pub fn is_empty(&self) -> bool {
        self.manufacturer.is_none()
            && self.plastic.is_none()
            && self.name.is_none()
            && self.img_url.is_none()
    }
}

/// Case-insensitive substring filters for disc listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscFilter {
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub plastic: Option<String>,
}
