mod check_in;
mod course;
mod disc;
mod validation;

pub use check_in::{CheckIn, CheckInFilter, NewCheckInRequest, SortDirection, UpdateCheckInRequest};
pub use course::{Course, NewCourse};
pub use disc::{CreateDiscRequest, Disc, DiscFilter, UpdateDiscRequest};
pub use validation::ValidationError;
