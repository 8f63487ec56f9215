pub mod memory_contacts;
pub mod pg_contacts;

pub use memory_contacts::MemoryContacts;
pub use pg_contacts::PgContacts;
