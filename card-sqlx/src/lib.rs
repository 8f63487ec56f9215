//! card-sqlx: PostgreSQL plumbing for ContactCard.

pub mod ident;
pub mod pool;
pub mod probe;

pub use ident::{IdentError, SchemaName};
pub use pool::{PgPoolFactory, PgState};
pub use probe::{schema_exists, SchemaProbe};

pub use sqlx::PgPool;
