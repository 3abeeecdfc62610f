/// JWT validation for the engagement service
///
/// Tokens are issued by the identity service; this service only validates.
/// RS256 only, no symmetric algorithms, to prevent algorithm confusion
/// attacks. The public key is loaded once at startup and immutable after.
use anyhow::{anyhow, Result};
use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

/// JWT claims issued by the identity service
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

static JWT_DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

/// Initialize the JWT public key from a PEM-formatted string.
///
/// Must be called during startup before any token validation. Can only be
/// called once.
pub fn initialize_jwt_keys(public_key_pem: &str) -> Result<()> {
    let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| anyhow!("Invalid JWT public key PEM: {}", e))?;

    JWT_DECODING_KEY
        .set(decoding_key)
        .map_err(|_| anyhow!("JWT keys already initialized"))
}

/// Validate a bearer token and return its decoded claims.
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let decoding_key = JWT_DECODING_KEY
        .get()
        .ok_or_else(|| anyhow!("JWT keys not initialized"))?;

    let validation = Validation::new(JWT_ALGORITHM);

    decode::<Claims>(token, decoding_key, &validation)
        .map_err(|e| anyhow!("Token validation failed: {}", e))
}
