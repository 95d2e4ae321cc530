//! Distinct states, users, countries and courses a disc has visited.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::state_codes::state_code;
use crate::models::CheckIn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelCounts {
    pub state_count: usize,
    pub user_count: usize,
    pub country_count: usize,
    pub course_count: usize,
}

/// Count distinct entities across `check_ins`, left to right.
///
/// States are normalized to their two-letter code. A state name missing from
/// the lookup table does not add a new state: it re-adds the most recently
/// resolved code instead, or nothing if no earlier check-in resolved one.
/// Usernames, countries and course names are compared verbatim, and
/// anonymous check-ins share a single user entry.
pub fn aggregate(check_ins: &[CheckIn]) -> TravelCounts {
    let mut states: HashSet<&'static str> = HashSet::new();
    let mut users: HashSet<Option<&str>> = HashSet::new();
    let mut countries: HashSet<&str> = HashSet::new();
    let mut courses: HashSet<&str> = HashSet::new();
    let mut current_state: Option<&'static str> = None;

    for check_in in check_ins {
        if let Some(code) = state_code(&check_in.state) {
            current_state = Some(code);
        } else {
            tracing::debug!(
                check_in_id = check_in.id,
                state = %check_in.state,
                "Unrecognized state name, carrying previous state forward"
            );
        }
        if let Some(code) = current_state {
            states.insert(code);
        }

        users.insert(check_in.username.as_deref());
        countries.insert(check_in.country.as_str());
        courses.insert(check_in.course_name.as_str());
    }

    TravelCounts {
        state_count: states.len(),
        user_count: users.len(),
        country_count: countries.len(),
        course_count: courses.len(),
    }
}
