pub mod extractor;

pub use extractor::Actor;
