//! Persistence collaborator: sea-orm entities and the repositories that
//! implement the collector's store traits.

pub mod config;
pub mod database;
pub mod entity;
pub mod repository;

pub use config::Config;
pub use database::connect;
pub use repository::{KlineRepository, SymbolRepository};
