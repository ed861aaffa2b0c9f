pub mod expiry;
pub mod health;
pub mod mrz;

pub use expiry::ExpiryValidator;
pub use health::{CellFlag, FlagKind, HealthReport, RowHealthScanner};
pub use mrz::MrzValidator;
