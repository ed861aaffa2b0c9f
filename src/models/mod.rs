pub mod columns;
pub mod countries;
pub mod data;

pub use countries::CountryTable;
pub use data::{CheckDigitValidity, Field, MrzCheck, MrzData, OcrOutput, PassportRecord};
