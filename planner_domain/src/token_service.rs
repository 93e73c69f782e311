use crate::error::AuthError;
use crate::models::SessionClaims;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

pub struct TokenConfig {
    pub secret: String,
    pub audience: String,
    pub issuer: String,
    pub algorithm: Algorithm,
}

impl TokenConfig {
    pub fn new(secret: String, audience: String, issuer: String, algorithm: Algorithm) -> Self {
        Self {
            secret,
            audience,
            issuer,
            algorithm,
        }
    }
}

/// Token service for issuing and verifying session tokens.
///
/// Time is always passed in so expiry is decided by the caller's clock.
pub trait TokenService: Send + Sync {
    /// Issue a token for `subject` that expires at `now + ttl`.
    fn issue(&self, subject: &str, now: DateTime<Utc>, ttl: Duration) -> Result<String, AuthError>;

    /// Return the token's subject if its signature is valid and it has not
    /// expired at `now`. A bad signature is reported even when the token is
    /// also expired.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError>;
}

pub struct JwtTokenService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtTokenService {
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn encode(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        encode(&Header::new(self.config.algorithm), claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenCreationError)
    }

    fn decode(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(self.config.algorithm);
        // Expiry is checked against the caller's `now` after the signature.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);

        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| {
                debug!(kind = ?e.kind(), "Rejected session token");
                AuthError::BadSignature
            })
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, subject: &str, now: DateTime<Utc>, ttl: Duration) -> Result<String, AuthError> {
        if subject.is_empty() {
            return Err(AuthError::InvalidInput("token subject must not be empty".to_string()));
        }
        if ttl <= Duration::zero() {
            return Err(AuthError::InvalidInput("token ttl must be positive".to_string()));
        }
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::InvalidInput("token ttl is out of range".to_string()))?;

        // `exp` is whole seconds and must never fall before the exact expiry.
        let exp = expires_at.timestamp() + i64::from(expires_at.timestamp_subsec_nanos() > 0);

        let claims = SessionClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
            expires_at,
        };

        self.encode(&claims)
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = self.decode(token)?;

        if now >= claims.expires_at {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims.sub)
    }
}
