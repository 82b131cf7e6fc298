pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod normalizer;
pub mod ranking;
pub mod routes;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use store::DriverStore;

#[derive(Clone)]
pub struct AppState {
    pub store: DriverStore,
}
