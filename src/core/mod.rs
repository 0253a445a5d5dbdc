pub mod aggregate;
pub mod config;
pub mod cur;
pub mod dataset;
pub mod formatter;
pub mod mirror;
pub mod models;
pub mod pipeline;
pub mod remote;
