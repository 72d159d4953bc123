//! PostgreSQL persistence for the pension unit engine
//!
//! Implements the `app_services` ports on PostgreSQL via SQLx. The schema
//! lives in the workspace `migrations/` directory and is embedded into the
//! binary by [`run_migrations`].
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool_from_url, run_migrations, PgStore};
//!
//! let pool = create_pool_from_url("postgres://localhost/pension").await?;
//! run_migrations(&pool).await?;
//! let store = PgStore::new(pool);
//! ```

pub mod error;
pub mod pool;
pub mod repositories;
pub mod store;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use store::{PgStore, PgUnitOfWork};
