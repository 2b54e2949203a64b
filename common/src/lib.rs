pub mod file_format;
pub mod float_ext;
pub mod log_setup;

pub use file_format::{FileFormatError, SerdeFormat};
pub use float_ext::FloatExt;

/// Default tolerance for approximate float comparisons.
pub const EPSILON: f64 = 1e-6;
