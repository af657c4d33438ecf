//! Result type aliases for the student courses data layer.

use crate::CoursesError;

/// A specialized `Result` type for data-layer operations.
pub type CoursesResult<T> = Result<T, CoursesError>;
