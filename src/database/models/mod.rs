pub mod operation;

pub use operation::{NewOperation, OperationRecord, OperationRow};
