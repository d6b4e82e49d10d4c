//! The request extractor that yields the authenticated tenant.

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use uuid::Uuid;

use crate::{
    app_state::AuthState,
    auth::token::{AuthError, AuthenticatedClaims},
};

/// The identifier of the tenant that owns a set of transactions.
pub type OwnerId = Uuid;

/// The authenticated tenant for the current request.
///
/// Extracting this type verifies the bearer token, so handlers that take it
/// can assume the request identity is concrete and well formed. There is no
/// anonymous fallback: a request without a usable subject claim is rejected
/// before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The tenant id taken from the token's subject claim.
    pub owner_id: OwnerId,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::MissingToken)?;

        let auth_state = AuthState::from_ref(state);
        let claims = auth_state.token_verifier.verify(bearer.token())?;

        let owner_id = current_owner_id(&claims)?;

        Ok(Self { owner_id })
    }
}

/// The tenant id asserted by `claims`.
///
/// # Errors
/// Returns [AuthError::InvalidSubject] if the subject claim is absent or not
/// a well-formed UUID. Every ledger operation needs a concrete owner, so this
/// never falls back to an empty or anonymous identity.
pub fn current_owner_id(claims: &AuthenticatedClaims) -> Result<OwnerId, AuthError> {
    claims
        .subject()
        .and_then(|subject| Uuid::parse_str(subject).ok())
        .ok_or(AuthError::InvalidSubject)
}
