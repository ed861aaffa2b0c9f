pub mod merge;
pub mod table;

pub use merge::{merge_columns, MergeSummary};
pub use table::{standard_header, Table};
