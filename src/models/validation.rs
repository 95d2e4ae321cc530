//! Input checks shared by the HTTP handlers and the admin CLI

use thiserror::Error;

use super::{CreateDiscRequest, NewCheckInRequest, UpdateCheckInRequest, UpdateDiscRequest};
use crate::travel::{Coordinate, GeoError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Blank(&'static str),
    #[error(transparent)]
    Coordinate(#[from] GeoError),
}

/// Reject the first blank field, skipping fields that were not provided
fn require_non_empty(fields: &[(&'static str, Option<&str>)]) -> Result<(), ValidationError> {
    match fields
        .iter()
        .find(|(_, value)| value.is_some_and(|v| v.trim().is_empty()))
    {
        Some((name, _)) => Err(ValidationError::Blank(*name)),
        None => Ok(()),
    }
}

impl CreateDiscRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&[
            ("id", Some(self.id.as_str())),
            ("manufacturer", Some(self.manufacturer.as_str())),
            ("plastic", Some(self.plastic.as_str())),
            ("name", Some(self.name.as_str())),
        ])
    }
}

impl UpdateDiscRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&[
            ("manufacturer", self.manufacturer.as_deref()),
            ("plastic", self.plastic.as_deref()),
            ("name", self.name.as_deref()),
        ])
    }
}

impl NewCheckInRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&[
            ("courseName", Some(self.course_name.as_str())),
            ("state", Some(self.state.as_str())),
            ("country", Some(self.country.as_str())),
        ])?;
        Coordinate::checked(self.latitude, self.longitude)?;
        Ok(())
    }
}

impl UpdateCheckInRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&[
            ("courseName", self.course_name.as_deref()),
            ("state", self.state.as_deref()),
            ("country", self.country.as_deref()),
        ])?;
        if let Some(latitude) = self.latitude {
            Coordinate::check_latitude(latitude)?;
        }
        if let Some(longitude) = self.longitude {
            Coordinate::check_longitude(longitude)?;
        }
        Ok(())
    }
}
