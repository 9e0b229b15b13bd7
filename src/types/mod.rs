pub mod condition;
pub mod payload;
pub mod records;
