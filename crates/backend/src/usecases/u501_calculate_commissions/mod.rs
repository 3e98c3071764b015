pub mod executor;

pub use executor::CalculateExecutor;
