mod tables;

pub use tables::{TableReporter, print_summary};
