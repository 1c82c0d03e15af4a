//! Transactional data access
//!
//! The executor owns the connection/transaction lifecycle; the outcome
//! module owns the fixed status-code protocol shared with the
//! stored-procedure layer.

pub mod executor;
pub mod outcome;

pub use executor::{ProcValue, ProcedureCall, ProcedureOutcome, TxExecutor};
pub use outcome::OperationResult;
