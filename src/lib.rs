pub mod auth;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod payments;
pub mod sweep;

pub use db::create_pool;
