pub mod error;
pub mod grading;
pub mod output;
pub mod parser;
