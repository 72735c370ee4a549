pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryOperationRepository;
pub use models::{NewOperation, OperationRecord};
pub use postgres::PgOperationRepository;
pub use repository::OperationRepository;
