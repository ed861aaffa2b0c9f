pub mod config;
pub mod models;
pub mod passport_batch;
pub mod processing;
pub mod storage;
pub mod utils;
pub mod validation;

pub use config::PipelineConfig;
pub use passport_batch::{BatchReport, PassportBatch};
