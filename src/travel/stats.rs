use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::counts::aggregate;
use super::distance::{total_distance, Coordinate, GeoError};
use crate::models::CheckIn;
use crate::storage::{Storage, StorageError};

#[derive(Debug, Error)]
pub enum TravelError {
    #[error("{0}")]
    NotFound(String),
    #[error("check in {check_in_id} has an unusable location: {source}")]
    InvalidCoordinate {
        check_in_id: i64,
        #[source]
        source: GeoError,
    },
    #[error(transparent)]
    Storage(anyhow::Error),
}

impl From<StorageError> for TravelError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => TravelError::NotFound(what),
            other => TravelError::Storage(other.into()),
        }
    }
}

/// Combined travel statistics for one disc
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelStats {
    /// Kilometers traveled between consecutive check-ins
    pub distance: f64,
    pub state_count: usize,
    pub user_count: usize,
    pub country_count: usize,
    pub course_count: usize,
}

/// Parse the stored coordinates of every check-in, preserving order
pub fn coordinates(log: &[CheckIn]) -> Result<Vec<Coordinate>, TravelError> {
    log.iter()
        .map(|check_in| {
            Coordinate::parse(&check_in.latitude, &check_in.longitude).map_err(|source| {
                TravelError::InvalidCoordinate {
                    check_in_id: check_in.id,
                    source,
                }
            })
        })
        .collect()
}

/// Distance and counts over a travel log already in chronological order
pub fn travel_stats(log: &[CheckIn]) -> Result<TravelStats, TravelError> {
    let distance = total_distance(&coordinates(log)?);
    let counts = aggregate(log);

    Ok(TravelStats {
        distance,
        state_count: counts.state_count,
        user_count: counts.user_count,
        country_count: counts.country_count,
        course_count: counts.course_count,
    })
}

/// Fetch a disc's travel log and compute its statistics
pub async fn stats_for_disc(storage: &dyn Storage, disc_id: &str) -> Result<TravelStats, TravelError> {
    let log = storage.travel_log(disc_id).await?;
    let stats = travel_stats(&log)?;
    tracing::debug!(
        disc_id,
        check_ins = log.len(),
        distance_km = stats.distance,
        "Computed travel stats"
    );
    Ok(stats)
}

/// Fetch a disc's travel log and compute only the distance traveled
pub async fn distance_for_disc(storage: &dyn Storage, disc_id: &str) -> Result<f64, TravelError> {
    let log = storage.travel_log(disc_id).await?;
    Ok(total_distance(&coordinates(&log)?))
}
