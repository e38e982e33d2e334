pub mod models;
pub mod schemas;

pub use models::*;
