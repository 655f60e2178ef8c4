use crate::identity::Principal;
use emojifeed_common::model::author::{AuthorId, InvalidAuthorIdError};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("The session verification key is invalid: {0}")]
    InvalidKey(jsonwebtoken::errors::Error),
    #[error("The session token was rejected: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),
    #[error("The session subject is not a valid author id: {0}")]
    InvalidSubject(#[from] InvalidAuthorIdError),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct SessionClaims {
    sub: String,
}

/// Verifies session tokens issued by the identity provider.
///
/// Tokens are JWTs whose `sub` claim names the signed in user.
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    #[must_use]
    pub fn new(key: DecodingKey, algorithm: Algorithm, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self { key, validation }
    }

    /// Verifier for RS256 tokens, the algorithm session tokens are signed with.
    pub fn from_rsa_pem(pem: &str, issuer: Option<&str>) -> Result<Self, SessionError> {
        let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(SessionError::InvalidKey)?;

        Ok(Self::new(key, Algorithm::RS256, issuer))
    }

    pub fn verify(&self, token: &str) -> Result<Principal, SessionError> {
        let claims = decode::<SessionClaims>(token, &self.key, &self.validation)
            .map_err(SessionError::InvalidToken)?
            .claims;

        Ok(Principal::new(AuthorId::new(claims.sub)?))
    }
}

impl std::fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("iss", &self.validation.iss)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::identity::session::{SessionError, SessionVerifier};
    use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, encode, get_current_timestamp};
    use serde_json::{Value, json};

    const SECRET: &[u8] = b"session-test-secret";

    fn verifier(issuer: Option<&str>) -> SessionVerifier {
        SessionVerifier::new(DecodingKey::from_secret(SECRET), Algorithm::HS256, issuer)
    }

    fn token(claims: &Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    fn in_an_hour() -> u64 {
        get_current_timestamp() + 3600
    }

    #[test]
    fn accepts_valid_session() {
        let token = token(&json!({
            "sub": "user_2xyz",
            "exp": in_an_hour(),
            "iss": "https://clerk.example",
            "azp": "http://localhost:3000",
        }));

        let principal = verifier(Some("https://clerk.example"))
            .verify(&token)
            .unwrap();
        assert_eq!(principal.author_id().get(), "user_2xyz");
    }

    #[test]
    fn rejects_expired_session() {
        let token = token(&json!({
            "sub": "user_2xyz",
            "exp": get_current_timestamp() - 3600,
        }));

        assert!(matches!(
            verifier(None).verify(&token),
            Err(SessionError::InvalidToken(_))
        ));
    }

    #[test]
    fn rejects_foreign_issuer() {
        let token = token(&json!({
            "sub": "user_2xyz",
            "exp": in_an_hour(),
            "iss": "https://evil.example",
        }));

        assert!(matches!(
            verifier(Some("https://clerk.example")).verify(&token),
            Err(SessionError::InvalidToken(_))
        ));
    }

    #[test]
    fn rejects_wrong_signature() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({ "sub": "user_2xyz", "exp": in_an_hour() }),
            &EncodingKey::from_secret(b"another-secret"),
        )
        .unwrap();

        assert!(matches!(
            verifier(None).verify(&token),
            Err(SessionError::InvalidToken(_))
        ));
    }

    #[test]
    fn rejects_missing_subject() {
        let token = token(&json!({ "exp": in_an_hour() }));
        assert!(verifier(None).verify(&token).is_err());

        let token = self::token(&json!({ "sub": "", "exp": in_an_hour() }));
        assert!(matches!(
            verifier(None).verify(&token),
            Err(SessionError::InvalidSubject(_))
        ));
    }

    #[test]
    fn rejects_garbage_key() {
        assert!(matches!(
            SessionVerifier::from_rsa_pem("not a key", None),
            Err(SessionError::InvalidKey(_))
        ));
    }
}
