pub mod aggregator;
pub mod error;
pub mod ranker;
pub mod report;
