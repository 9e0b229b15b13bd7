pub mod error;
pub mod extractor;
pub mod parser;
