pub mod actors;
pub mod config;
pub mod pipeline;
pub mod store;
