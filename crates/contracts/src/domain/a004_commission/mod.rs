pub mod aggregate;
pub mod breakdown;
pub mod requests;
