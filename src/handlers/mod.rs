pub mod driver;
pub mod health;
