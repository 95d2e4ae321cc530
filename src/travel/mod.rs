//! Travel statistics for a disc's check-in history
//!
//! Everything here is pure computation over check-ins that have already been
//! loaded. The only async entry points, [`stats_for_disc`] and
//! [`distance_for_disc`], do a single storage fetch before computing.

pub mod counts;
pub mod distance;
pub mod state_codes;
pub mod stats;

pub use counts::{aggregate, TravelCounts};
pub use distance::{distance_between, total_distance, Coordinate, GeoError, EARTH_RADIUS_KM};
pub use state_codes::state_code;
pub use stats::{distance_for_disc, stats_for_disc, travel_stats, TravelError, TravelStats};
