//! Fetching and caching of the identity provider's signing keys.

use std::{str::FromStr, time::Duration};

use jsonwebtoken::{
    Algorithm, DecodingKey,
    jwk::{AlgorithmParameters, EllipticCurve, Jwk, JwkSet},
};

/// How long the startup fetch of the key set may take before giving up.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// The path at which the identity provider publishes its key set.
const JWKS_PATH: &str = "/auth/v1/.well-known/jwks.json";

/// The path of the provider's token-issuing endpoint.
const ISSUER_PATH: &str = "/auth/v1";

/// The URL of the key-set endpoint for the identity provider at `base_url`.
pub fn jwks_url(base_url: &str) -> String {
    format!("{}{JWKS_PATH}", base_url.trim_end_matches('/'))
}

/// The expected `iss` claim for tokens issued by the provider at `base_url`.
pub fn issuer(base_url: &str) -> String {
    format!("{}{ISSUER_PATH}", base_url.trim_end_matches('/'))
}

/// The errors that can occur while building the signing key set.
#[derive(Debug, thiserror::Error)]
pub enum KeySetError {
    /// The key-set endpoint could not be reached or returned a non-success
    /// response.
    #[error("could not fetch the signing key set: {0}")]
    Fetch(#[from] reqwest::Error),

    /// A published key could not be converted into a verification key.
    #[error("unusable signing key {key_id:?}: {reason}")]
    UnusableKey {
        /// The `kid` of the offending key, when present.
        key_id: Option<String>,
        /// Why the key could not be used.
        reason: String,
    },

    /// The key set did not contain any keys.
    #[error("the signing key set is empty")]
    Empty,
}

/// A single verification key from the provider's key set.
#[derive(Clone)]
pub struct SigningKey {
    key_id: Option<String>,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl SigningKey {
    /// The key to verify token signatures with.
    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// The algorithm this key verifies.
    pub(crate) fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl TryFrom<&Jwk> for SigningKey {
    type Error = KeySetError;

    fn try_from(jwk: &Jwk) -> Result<Self, Self::Error> {
        let key_id = jwk.common.key_id.clone();

        let decoding_key = DecodingKey::from_jwk(jwk).map_err(|error| KeySetError::UnusableKey {
            key_id: key_id.clone(),
            reason: error.to_string(),
        })?;

        let algorithm = algorithm_for(jwk).ok_or_else(|| KeySetError::UnusableKey {
            key_id: key_id.clone(),
            reason: "no supported verification algorithm".to_owned(),
        })?;

        Ok(Self {
            key_id,
            decoding_key,
            algorithm,
        })
    }
}

/// The set of public signing keys published by the identity provider.
///
/// Fetching the set is a hard startup dependency: a failure here should abort
/// the process rather than let it serve requests it can never authenticate.
/// Once built, the set is immutable and safe to share across request tasks.
#[derive(Debug, Clone)]
pub struct SigningKeySet {
    keys: Vec<SigningKey>,
}

impl SigningKeySet {
    /// Fetch the key set from the provider's well-known endpoint.
    ///
    /// # Errors
    /// Returns a [KeySetError] if the endpoint is unreachable, responds with
    /// a non-success status, or publishes a document without usable keys.
    pub async fn fetch(jwks_url: &str) -> Result<Self, KeySetError> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;

        let jwk_set = client
            .get(jwks_url)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;

        Self::from_jwk_set(&jwk_set)
    }

    /// Build the key set from an already parsed JWK document.
    ///
    /// # Errors
    /// Returns a [KeySetError] if the document is empty or a key cannot be
    /// converted into a verification key.
    pub fn from_jwk_set(jwk_set: &JwkSet) -> Result<Self, KeySetError> {
        let keys = jwk_set
            .keys
            .iter()
            .map(SigningKey::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        if keys.is_empty() {
            return Err(KeySetError::Empty);
        }

        Ok(Self { keys })
    }

    /// The keys to try for a token whose header carries `key_id`.
    ///
    /// A token without a key ID may have been signed with any key in the set.
    pub(crate) fn candidates(&self, key_id: Option<&str>) -> Vec<&SigningKey> {
        match key_id {
            Some(kid) => self
                .keys
                .iter()
                .filter(|key| key.key_id.as_deref() == Some(kid))
                .collect(),
            None => self.keys.iter().collect(),
        }
    }
}

/// The verification algorithm for `jwk`: its `alg` field when present,
/// otherwise inferred from the key type.
fn algorithm_for(jwk: &Jwk) -> Option<Algorithm> {
    if let Some(key_algorithm) = jwk.common.key_algorithm {
        return Algorithm::from_str(&key_algorithm.to_string()).ok();
    }

    match &jwk.algorithm {
        AlgorithmParameters::RSA(_) => Some(Algorithm::RS256),
        AlgorithmParameters::EllipticCurve(params) => match params.curve {
            EllipticCurve::P256 => Some(Algorithm::ES256),
            EllipticCurve::P384 => Some(Algorithm::ES384),
            _ => None,
        },
        AlgorithmParameters::OctetKey(_) => Some(Algorithm::HS256),
        AlgorithmParameters::OctetKeyPair(_) => Some(Algorithm::EdDSA),
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{Algorithm, jwk::JwkSet};

    use crate::test_utils::TEST_KEY_ID;

    use super::{KeySetError, SigningKeySet, issuer, jwks_url};

    #[test]
    fn derives_key_set_url_from_base_url() {
        assert_eq!(
            jwks_url("https://project.supabase.co/"),
            "https://project.supabase.co/auth/v1/.well-known/jwks.json"
        );
    }

    #[test]
    fn derives_issuer_from_base_url() {
        assert_eq!(
            issuer("https://project.supabase.co"),
            "https://project.supabase.co/auth/v1"
        );
    }

    #[test]
    fn builds_keys_from_jwk_document() {
        let key_set = crate::test_utils::test_key_set();

        assert_eq!(key_set.candidates(Some(TEST_KEY_ID)).len(), 1);
        assert_eq!(
            key_set.candidates(Some(TEST_KEY_ID))[0].algorithm(),
            Algorithm::HS256
        );
        assert!(key_set.candidates(Some("no-such-key")).is_empty());
    }

    #[test]
    fn tokens_without_key_id_try_every_key() {
        let key_set = crate::test_utils::test_key_set();

        assert_eq!(key_set.candidates(None).len(), 1);
    }

    #[test]
    fn rejects_empty_key_set() {
        let empty: JwkSet = serde_json::from_str(r#"{"keys": []}"#).unwrap();

        assert!(matches!(
            SigningKeySet::from_jwk_set(&empty),
            Err(KeySetError::Empty)
        ));
    }
}
