//! Identity provider: the account directory plus bearer id-token handling.
//!
//! The rest of the crate treats this as an external collaborator with two
//! entry points: `create_account` (registration) and `verify_id_token`
//! (request authentication). Accounts live in their own table, separate from
//! the mirrored `users` profiles.

use bcrypt::{DEFAULT_COST, hash};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// Creates an account and returns its subject id. Duplicate emails surface as
/// a store error; the caller treats every failure here as Upstream.
pub async fn create_account(
    pool: &PgPool,
    email: &str,
    password: &str,
    name: &str,
) -> Result<String, AppError> {
    let subject_id = Uuid::new_v4().to_string();
    let password_hash = hash(password.as_bytes(), DEFAULT_COST)?;

    sqlx::query(
        "INSERT INTO accounts (subject_id, email, password_hash, display_name) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(&subject_id)
    .bind(email)
    .bind(&password_hash)
    .bind(name)
    .execute(pool)
    .await?;

    Ok(subject_id)
}

/// Verifies a bearer id-token. Purely cryptographic: no directory lookup, the
/// access guard resolves the subject against the profile store afterwards.
pub fn verify_id_token(token: &str, config: &Config) -> Result<IdentityClaims, AppError> {
    let token_data = decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}

/// Mints an id-token for a subject, the way a client would obtain one from
/// the identity provider after signing in.
pub fn mint_id_token(
    subject_id: &str,
    email: &str,
    config: &Config,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expiration = now
        + Duration::seconds(config.id_token_expiration().as_secs() as i64);

    let claims = IdentityClaims {
        sub: subject_id.to_string(),
        email: email.to_string(),
        exp: expiration.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: String::new(),
            jwt_secret: "test-secret".into(),
            id_token_expiration_secs: 3600,
            server_host: "127.0.0.1".into(),
            server_port: 5000,
            production: false,
        }
    }

    #[test]
    fn minted_token_verifies() {
        let config = test_config();
        let token = mint_id_token("subject-1", "a@x.com", &config).unwrap();
        let claims = verify_id_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "subject-1");
        assert_eq!(claims.email, "a@x.com");
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let config = test_config();
        let mut other = test_config();
        other.jwt_secret = "another-secret".into();
        let token = mint_id_token("subject-1", "a@x.com", &other).unwrap();
        assert!(matches!(
            verify_id_token(&token, &config),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn rejects_garbage_token() {
        let config = test_config();
        assert!(matches!(
            verify_id_token("not-a-jwt", &config),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let config = test_config();
        let now = Utc::now();
        let claims = IdentityClaims {
            sub: "subject-1".into(),
            email: "a@x.com".into(),
            exp: (now - Duration::hours(2)).timestamp(),
            iat: (now - Duration::hours(3)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();
        assert!(matches!(
            verify_id_token(&token, &config),
            Err(AppError::Unauthorized(_))
        ));
    }
}
