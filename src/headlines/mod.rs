pub mod insights;
pub mod selector;
