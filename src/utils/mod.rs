pub mod format;
pub mod serde_helpers;
