pub mod backend;
pub mod cli;
pub mod config;
pub mod form;
pub mod graphql;
pub mod loader;
pub mod models;
pub mod render;
pub mod server;
pub mod session;
