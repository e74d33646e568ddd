pub mod charts;
pub mod handlers;
pub mod models;
pub mod server;
