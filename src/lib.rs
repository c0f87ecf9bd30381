pub mod api;
pub mod assistant;
pub mod config;
pub mod error;
pub mod indicator;
pub mod market;
pub mod model;
pub mod news;
pub mod snapshot;
