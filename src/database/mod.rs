pub mod manager;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{Child, Entity, Repository};
pub use store::{Collection, Query, Store, Transaction};
