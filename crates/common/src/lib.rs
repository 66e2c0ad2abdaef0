//! Identifier types shared by the store, domain and API crates.

mod types;

pub use types::DocumentId;
pub use uuid::Error as UuidError;
pub use uuid::Uuid;
