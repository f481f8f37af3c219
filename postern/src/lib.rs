pub mod config;
pub mod controller;
pub mod report;

pub use config::ServerConfig;
pub use controller::Postern;
