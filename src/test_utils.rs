#![allow(missing_docs)]

//! Helpers shared by the test modules: a deterministic HMAC signing key set
//! and a token mint, so tests exercise real signature verification without
//! touching the network.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, jwk::JwkSet};
use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

use crate::{
    AppState,
    auth::{SigningKeySet, TokenVerifier},
    pagination::PaginationConfig,
};

pub const TEST_SECRET: &[u8] = b"mycash-test-signing-secret";
pub const TEST_KEY_ID: &str = "test-key";
pub const TEST_ISSUER: &str = "https://auth.example.test/auth/v1";

/// A key set holding a single symmetric key, as if fetched from the identity
/// provider.
pub fn test_key_set() -> SigningKeySet {
    let jwk_set: JwkSet = serde_json::from_value(json!({
        "keys": [{
            "kty": "oct",
            "kid": TEST_KEY_ID,
            "alg": "HS256",
            "k": URL_SAFE_NO_PAD.encode(TEST_SECRET),
        }]
    }))
    .expect("test JWK document should deserialize");

    SigningKeySet::from_jwk_set(&jwk_set).expect("test key set should build")
}

pub fn test_verifier() -> TokenVerifier {
    TokenVerifier::new(test_key_set(), TEST_ISSUER)
}

/// Mint a signed token with the given claims payload.
pub fn mint_token_with_claims(claims: serde_json::Value) -> String {
    let mut header = Header::default();
    header.kid = Some(TEST_KEY_ID.to_owned());

    jsonwebtoken::encode(&header, &claims, &EncodingKey::from_secret(TEST_SECRET))
        .expect("test token should encode")
}

/// Mint a valid token for `owner_id`, expiring an hour from now.
pub fn mint_token(owner_id: Uuid) -> String {
    mint_token_with_claims(json!({
        "sub": owner_id.to_string(),
        "iss": TEST_ISSUER,
        "aud": "authenticated",
        "exp": Utc::now().timestamp() + 3600,
    }))
}

/// An [AppState] backed by an in-memory database and the test verifier.
pub fn test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

    AppState::new(connection, test_verifier(), PaginationConfig::default())
        .expect("test app state should build")
}
