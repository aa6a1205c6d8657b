// Storage layer for the stamp rally control-plane
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)
//
// - StorageBackend: enum dispatch over both databases for plain reads and CRUD
// - UnitOfWork: atomic scope for every operation that touches the stamp ledger

pub mod backend;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod unit_of_work;

pub use backend::StorageBackend;
pub use memory::InMemoryDatabase;
pub use models::*;
pub use repositories::*;
pub use unit_of_work::UnitOfWork;
