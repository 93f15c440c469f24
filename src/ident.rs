//! Identifier collaborator
//!
//! Fresh record ids are requested from an [`IdGenerator`] at creation time.

use std::sync::Arc;

use uuid::Uuid;

/// Produces globally unique record identifiers
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

impl<G: IdGenerator + ?Sized> IdGenerator for Arc<G> {
    fn next_id(&self) -> String {
        (**self).next_id()
    }
}

/// Random (v4) UUIDs in hyphenated form, 36 bytes each
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
