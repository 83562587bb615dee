//! Extracts the worked examples from problem-statement HTML and normalizes
//! them into whitespace-delimited lines a judge can feed to a solution.

pub mod fetch;
pub mod parser;
pub mod runner;
pub mod store;
