use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::services::identity::Identity;

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Username
    pub uid: i32,    // User ID
    pub admin: bool,
    pub exp: usize, // Expiration timestamp
}

/// Sign a bearer token for a resolved identity.
pub fn sign(identity: &Identity, secret: &str, ttl_hours: i64) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(ttl_hours))
        .ok_or_else(|| anyhow::anyhow!("token expiry overflows"))?
        .timestamp();

    let claims = Claims {
        sub: identity.username.clone(),
        uid: identity.user_id,
        admin: identity.is_admin,
        exp: expiration as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Verify a token and recover the identity it was issued for.
pub fn verify(token: &str, secret: &str) -> Result<Identity> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(Identity {
        user_id: data.claims.uid,
        username: data.claims.sub,
        is_admin: data.claims.admin,
    })
}
