pub mod history_service;

pub use history_service::{
    CalculationOutcome, CalculationRequest, HistoryChange, HistoryError, HistoryService,
    OperationInput,
};
