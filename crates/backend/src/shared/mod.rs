pub mod commission;
pub mod config;
pub mod data;
pub mod errors;
pub mod format;
pub mod shopify;
