//! Host integration boundary for Pingie.
//!
//! Owns the credential table, registers one notification service per
//! configured entry, persists entries, and drives setup, reload,
//! reconfiguration and teardown.

pub mod entry;
pub mod error;
pub mod integration;
pub mod registry;
pub mod table;

pub use entry::{ConfigEntry, EntryStore};
pub use error::HostError;
pub use integration::{build_sender, Integration};
pub use registry::{service_name_for, ServiceCall, ServiceRegistry};
pub use table::CredentialTable;
