//! Verification of externally issued access tokens.
//!
//! The identity provider signs access tokens with keys it publishes at a
//! well-known key-set endpoint. The keys are fetched once at startup and are
//! read-only afterwards; per-request work is limited to decoding and
//! verifying the presented token and extracting the tenant it asserts.

mod extractor;
mod keys;
mod token;

pub use extractor::{AuthenticatedUser, OwnerId, current_owner_id};
pub use keys::{KeySetError, SigningKeySet, issuer, jwks_url};
pub use token::{AuthError, AuthenticatedClaims, TokenVerifier};
