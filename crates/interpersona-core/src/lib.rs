#![forbid(unsafe_code)]

pub mod config;
pub mod errors;
pub mod payload;
pub mod profile;
pub mod reference;
pub mod schema;
pub mod state;
pub mod traits;
pub mod types;
