//! Decoding and verification of inbound bearer tokens.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use base64::Engine as _;
use chrono::Utc;
use jsonwebtoken::{Validation, decode, decode_header};
use serde::Deserialize;

use crate::{auth::keys::SigningKeySet, problem};

/// The audience the identity provider sets on access tokens.
const EXPECTED_AUDIENCE: &str = "authenticated";

/// The reasons verification of a bearer token can fail.
///
/// The variants are logged server-side; clients only ever see a uniform 401
/// problem response, so the response does not leak why a token was rejected.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AuthError {
    /// The request had no `Authorization: Bearer` header.
    #[error("missing bearer token")]
    MissingToken,

    /// The token was not a well-formed JWT.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The token signature did not match any cached signing key.
    #[error("the token signature could not be verified")]
    InvalidSignature,

    /// The `iss` claim did not match the configured identity provider.
    #[error("unexpected token issuer")]
    InvalidIssuer,

    /// The `aud` claim did not match the expected audience.
    #[error("unexpected token audience")]
    InvalidAudience,

    /// The token expiry is in the past.
    #[error("the token has expired")]
    TokenExpired,

    /// The subject claim is missing or not a well-formed identifier.
    #[error("missing or malformed subject claim")]
    InvalidSubject,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::warn!("rejected request credentials: {}", self);

        problem::problem_response(
            StatusCode::UNAUTHORIZED,
            "Unauthorized access",
            "You do not have permission to access this resource",
        )
    }
}

/// The claims extracted from a verified token.
///
/// The payload is decoded into this fixed shape up front rather than probed
/// field by field; a payload that does not fit is rejected as malformed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthenticatedClaims {
    /// The stable subject identifier assigned by the identity provider.
    pub sub: Option<String>,
    /// The token-issuing URL of the provider.
    pub iss: Option<String>,
    /// The audience the token was issued for.
    pub aud: Option<String>,
    /// The Unix timestamp after which the token is no longer valid.
    pub exp: Option<i64>,
}

impl AuthenticatedClaims {
    /// The stable subject identifier, regardless of how the provider maps its
    /// claim names.
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }
}

/// Verifies inbound bearer tokens against the cached signing key set.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keys: SigningKeySet,
    issuer: String,
}

impl TokenVerifier {
    /// Create a verifier for tokens issued by `issuer` and signed with a key
    /// in `keys`.
    pub fn new(keys: SigningKeySet, issuer: impl Into<String>) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
        }
    }

    /// Validate `raw_token` and extract its claims.
    ///
    /// The raw value may carry transport artifacts such as surrounding quotes
    /// or stray newlines; these are stripped before decoding.
    ///
    /// # Errors
    /// Returns an [AuthError] describing the first check that failed:
    /// segment structure, payload decode, signature, issuer, audience,
    /// expiry, in that order. A token without an `exp` claim is accepted.
    pub fn verify(&self, raw_token: &str) -> Result<AuthenticatedClaims, AuthError> {
        let token = sanitize(raw_token);

        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(AuthError::MalformedToken(format!(
                "expected 3 segments, got {}",
                segments.len()
            )));
        }

        let claims = decode_claims(segments[1])?;

        self.verify_signature(&token)?;

        if claims.iss.as_deref() != Some(self.issuer.as_str()) {
            return Err(AuthError::InvalidIssuer);
        }

        if claims.aud.as_deref() != Some(EXPECTED_AUDIENCE) {
            return Err(AuthError::InvalidAudience);
        }

        if let Some(exp) = claims.exp
            && exp <= Utc::now().timestamp()
        {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }

    fn verify_signature(&self, token: &str) -> Result<(), AuthError> {
        let header =
            decode_header(token).map_err(|error| AuthError::MalformedToken(error.to_string()))?;

        for key in self.keys.candidates(header.kid.as_deref()) {
            // Issuer, audience, and expiry are checked against the decoded
            // claims by the caller; this pass only establishes the signature.
            let mut validation = Validation::new(key.algorithm());
            validation.validate_exp = false;
            validation.validate_aud = false;
            validation.required_spec_claims.clear();

            if decode::<serde_json::Value>(token, key.decoding_key(), &validation).is_ok() {
                return Ok(());
            }
        }

        Err(AuthError::InvalidSignature)
    }
}

/// Strip quotes and line breaks that clients and proxies sometimes leave in
/// the `Authorization` header value.
fn sanitize(raw_token: &str) -> String {
    raw_token.trim().replace(['"', '\'', '\r', '\n'], "")
}

/// Decode the payload segment of a token into its claims.
///
/// The segment is URL-safe base64; any padding is stripped first so both
/// padded and unpadded encodings decode.
fn decode_claims(payload_segment: &str) -> Result<AuthenticatedClaims, AuthError> {
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload_segment.trim_end_matches('='))
        .map_err(|error| {
            AuthError::MalformedToken(format!("payload is not valid base64: {error}"))
        })?;

    serde_json::from_slice(&bytes).map_err(|error| {
        AuthError::MalformedToken(format!("payload is not a valid claims map: {error}"))
    })
}
