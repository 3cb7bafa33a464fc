pub mod definitions;
pub mod validation;

// Re-export commonly used items from definitions
pub use definitions::*;
pub use validation::{validate_entry, validate_locale};
