pub mod quote;
pub mod report;

pub use quote::*;
pub use report::{MeasurementRegister, TdReport};
