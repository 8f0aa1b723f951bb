pub mod account;
pub mod analytics;
pub mod budget;
pub mod category;
pub mod config;
pub mod engine;
pub mod operation;
pub mod store;
pub mod transaction;
