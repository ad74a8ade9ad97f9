pub mod api;
pub mod catalog;
pub mod config;
pub mod extractors;
pub mod models;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use api::{create_router, run_server, AppState};
pub use config::Config;
