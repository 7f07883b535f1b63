//! Authentication middleware for JWT token validation
//!
//! Tokens are issued elsewhere. This layer checks the signature and expiry
//! once and hands the decoded claims to handlers as [`IdentityClaims`];
//! nothing downstream re-validates them.

use std::env;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::{error::ApiError, models::IdentityClaims, state::AppState};

/// JWT verification settings
#[derive(Debug, Clone)]
pub enum AuthConfig {
    /// RS256 public key in PEM format
    RsaPublicKey(String),
    /// HS256 shared secret
    Secret(String),
}

impl AuthConfig {
    /// Create a new AuthConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_PUBLIC_KEY`: RS256 public key (PEM) or path to a PEM file
    /// - `JWT_SECRET`: HS256 secret, used when no public key is set
    pub fn from_env() -> Result<Self, String> {
        if let Ok(public_key) = env::var("JWT_PUBLIC_KEY") {
            // If the public key looks like a file path, read from file
            let public_key = if public_key.starts_with("-----BEGIN") {
                public_key
            } else {
                std::fs::read_to_string(&public_key)
                    .map_err(|e| format!("Failed to read public key file: {}", e))?
                    .trim()
                    .to_string()
            };
            return Ok(AuthConfig::RsaPublicKey(public_key));
        }

        env::var("JWT_SECRET")
            .map(AuthConfig::Secret)
            .map_err(|_| "Neither JWT_PUBLIC_KEY nor JWT_SECRET is set".to_string())
    }
}

/// Verifies bearer tokens and extracts their claims
#[derive(Clone)]
pub struct Authenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Authenticator {
    pub fn from_config(config: &AuthConfig) -> Result<Self, jsonwebtoken::errors::Error> {
        match config {
            AuthConfig::RsaPublicKey(pem) => Self::from_rsa_pem(pem.as_bytes()),
            AuthConfig::Secret(secret) => Ok(Self::from_secret(secret.as_bytes())),
        }
    }

    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self {
            decoding_key: DecodingKey::from_rsa_pem(pem)?,
            validation: Validation::new(Algorithm::RS256),
        })
    }

    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Validate a token and return its claims
    pub fn decode(&self, token: &str) -> Result<IdentityClaims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)?;
        Ok(IdentityClaims::new(data.claims))
    }
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::Unauthorized)?;

    let claims = state.authenticator.decode(bearer.token()).map_err(|e| {
        warn!("Failed to validate token: {}", e);
        ApiError::Unauthorized
    })?;

    if claims.user_id().is_none() {
        error!("Token subject is not a user id");
        return Err(ApiError::Unauthorized);
    }

    // Insert the claims into the request extensions
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
