//! JWT token generation and validation
//!
//! Implements stateless bearer tokens signed with HMAC-SHA256.
//! A token carries the owner id as its subject and expires a fixed time
//! after issuance; there is no revocation.

use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// The only algorithm tokens are issued with or accepted under
const ALGORITHM: Algorithm = Algorithm::HS256;

/// Default token lifetime (24 hours)
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - owner id
    pub sub: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
}

/// JWT token generation and validation errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[source] jsonwebtoken::errors::Error),

    #[error("Signing secret must not be empty")]
    EmptySecret,

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Unexpected signing algorithm: {0:?}")]
    AlgorithmMismatch(Algorithm),

    #[error("Token subject is missing")]
    MissingSubject,

    #[error("System time error: {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),
}

/// Issues and verifies access tokens
///
/// Built once at startup from the server secret and shared immutably
/// by every request.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &ALGORITHM)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Create an issuer for `secret`
    ///
    /// # Errors
    ///
    /// * `JwtError::EmptySecret` - An empty key would make every signature forgeable
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::EmptySecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generate a token whose subject is `owner_id`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use notes_api::auth::jwt::{TokenIssuer, DEFAULT_TTL};
    ///
    /// let issuer = TokenIssuer::new(b"server-secret", DEFAULT_TTL).unwrap();
    /// let token = issuer.issue(42).expect("Failed to generate token");
    /// assert_eq!(issuer.verify(&token).unwrap(), "42");
    /// ```
    pub fn issue(&self, owner_id: i64) -> Result<String, JwtError> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

        let claims = Claims {
            sub: owner_id.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs(),
        };

        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key).map_err(JwtError::EncodingError)
    }

    /// Validate a token and return its raw subject
    ///
    /// The header algorithm is checked explicitly before any signature work:
    /// a token announcing anything other than HS256 is rejected outright.
    /// Parsing the subject into an id is left to the caller.
    pub fn verify(&self, token: &str) -> Result<String, JwtError> {
        let header = decode_header(token).map_err(|_| JwtError::InvalidToken)?;
        if header.alg != ALGORITHM {
            return Err(JwtError::AlgorithmMismatch(header.alg));
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.algorithms = vec![ALGORITHM];
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_) => {
                    JwtError::MissingSubject
                }
                _ => JwtError::InvalidToken,
            }
        })?;

        let subject = token_data.claims.sub;
        if subject.trim().is_empty() {
            return Err(JwtError::MissingSubject);
        }

        Ok(subject)
    }
}
