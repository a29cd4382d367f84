pub mod constants;
pub mod filename;
pub mod format;
pub mod templates;
pub mod test_helpers;
pub mod types;
pub mod validation;
