//! PostgreSQL persistence for classification records.
//!
//! Provides the diesel schema, embedded migrations, connection pooling and
//! two [`ClassificationRepository`](algobio_interface::ClassificationRepository)
//! implementations: one on PostgreSQL and one in memory.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod connection;
mod in_memory;
mod models;
mod repository;
pub mod schema;

pub use algobio_error::{DatabaseError, DatabaseErrorKind, DatabaseResult};
pub use connection::{MIGRATIONS, PgPool, create_pool, run_migrations};
pub use in_memory::InMemoryClassificationRepository;
pub use models::{ClassificationRow, NewClassificationRow};
pub use repository::PgClassificationRepository;
