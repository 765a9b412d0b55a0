//! # Veil
//!
//! `veil_core` wraps dynamic records in access-controlled views.
//!
//! Key concepts:
//!
//! 1. **Record**: a shared, ordered mapping from names or symbols to values.
//!
//! 2. **View**: mediates reads, writes, existence checks, deletions,
//!    definitions and enumeration, hiding every key the policy marks private.
//!
//! 3. **Revocation**: a token paired with a view can cut it off permanently
//!    without touching the record.

pub mod audit;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod id;
pub mod key;
pub mod operation;
pub mod policy;
pub mod record;
pub mod registry;
pub mod revocable;
pub mod view;

pub use audit::{AccessOutcome, AuditEntry, AuditLog};
pub use config::ViewConfig;
pub use descriptor::{Property, PropertyDescriptor};
pub use error::{ConfigError, Result, ViewError};
pub use id::ViewId;
pub use key::{PropertyKey, Symbol};
pub use operation::Operation;
pub use policy::AccessPolicy;
pub use record::Record;
pub use registry::ViewRegistry;
pub use revocable::{create_revocable, RevocationToken};
pub use view::{AccessControlledView, ViewBuilder, ViewState};
