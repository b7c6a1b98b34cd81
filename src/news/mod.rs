pub mod intake;
pub mod models;
