//! Envelope-encryption engine for Sealbox.
//!
//! Ties the crypto layer to the stores:
//! - `IdentityService` owns per-user key material: creation, credential
//!   custody, authentication (the bridge any network-facing auth layer
//!   consumes).
//! - `DocumentService` owns the document lifecycle: upload, share, revoke,
//!   download, delete, with the owner-unwrap authorization check.
//!
//! The engine is stateless between calls; both services hold only injected
//! store handles. Unlocked private keys live for the span of one call chain
//! and are never cached.

mod documents;
mod error;
mod identity;

pub use documents::{DocumentService, DownloadedDocument, ShareOutcome, UploadOutcome};
pub use error::{EngineError, EngineResult};
pub use identity::{AuthenticatedUser, CreatedUser, IdentityService, NewUser};
