//! Folio core library: portfolio content and its storage.
//!
//! `folio-core` knows nothing about HTTP. It defines the content documents
//! an admin can manage, their validation rules, and the storage seam the
//! web server persists them through.
//!
//! # Modules
//!
//! - [`content`]: Document types ([`Project`], [`Experience`], [`Education`], [`Skill`], [`Interest`]) and the [`Document`] trait.
//! - [`store`]: The [`ContentStore`] trait, the in-memory [`MemoryStore`] and the typed [`Collection`] facade.
//! - [`error`]: Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod content;
pub mod error;
pub mod store;

pub use content::{
    Document, Education, Experience, Interest, Project, Record, Skill, COLLECTIONS,
};
pub use error::{CoreError, CoreResult};
pub use store::{Collection, ContentStore, MemoryStore, StoredRecord};
