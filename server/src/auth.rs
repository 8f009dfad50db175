use crate::error::{AppError, AppResult};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

/// Claims carried by tokens issued by the external identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Subject (caller ID)
    pub name: String, // Display name of the caller
    pub exp: i64,     // Expiration time (Unix timestamp)
    pub iat: i64,     // Issued at (Unix timestamp)
}

impl Claims {
    /// Create new claims with default expiration (24 hours)
    pub fn new(caller_id: &str, display_name: &str) -> Self {
        let now = Utc::now().timestamp();
        let exp = now + (24 * 60 * 60); // 24 hours from now

        Self {
            sub: caller_id.to_string(),
            name: display_name.to_string(),
            exp,
            iat: now,
        }
    }
}

/// Generate a JWT token from claims. The server itself never issues tokens
/// in production; this exists for tooling and tests standing in for the
/// identity provider.
pub fn generate_token(claims: &Claims, secret: &str) -> AppResult<String> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate JWT token: {}", e)))?;

    Ok(token)
}

/// Validate and decode a JWT token
pub fn validate_token(token: &str, secret: &str) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}

/// The authenticated caller as resolved from the identity provider's token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: String,
    pub display_name: String,
}

/// Explicit outcome of identity resolution. Handlers decide what an
/// unauthenticated caller gets; this type never performs navigation.
#[derive(Debug, Clone)]
pub enum AuthResult {
    Authenticated(Identity),
    Unauthenticated,
}

impl AuthResult {
    /// Resolve the caller from a bearer token, if any. An identity without a
    /// resolvable display name counts as unauthenticated.
    pub fn identify(auth_header: Option<&str>, jwt_secret: Option<&str>) -> Self {
        let Some(secret) = jwt_secret else {
            tracing::warn!("Auth skipped: no JWT secret configured");
            return AuthResult::Unauthenticated;
        };

        let Some(token) = auth_header.and_then(|h| h.strip_prefix("Bearer ")) else {
            return AuthResult::Unauthenticated;
        };

        match validate_token(token, secret) {
            Ok(claims) if !claims.name.trim().is_empty() => {
                AuthResult::Authenticated(Identity {
                    id: claims.sub,
                    display_name: claims.name,
                })
            }
            Ok(claims) => {
                tracing::warn!("Auth failed: token for {} has no display name", claims.sub);
                AuthResult::Unauthenticated
            }
            Err(_) => {
                tracing::warn!("Auth failed: invalid or expired token");
                AuthResult::Unauthenticated
            }
        }
    }

    /// Require an authenticated caller, failing with `Unauthorized` otherwise.
    pub fn require(self) -> AppResult<Identity> {
        match self {
            AuthResult::Authenticated(identity) => Ok(identity),
            AuthResult::Unauthenticated => Err(AppError::Unauthorized(
                "Authentication required".to_string(),
            )),
        }
    }
}

impl FromRequest for AuthResult {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let jwt_secret = req
            .app_data::<web::Data<crate::handlers::AppState>>()
            .and_then(|state| state.config.auth.as_ref())
            .and_then(|auth| auth.jwt_secret.clone());

        let auth_header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        ready(Ok(AuthResult::identify(
            auth_header.as_deref(),
            jwt_secret.as_deref(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_token_generation_and_validation() {
        let secret = "test_secret_key_for_jwt";

        let claims = Claims::new("user-42", "Alice");
        let token = generate_token(&claims, secret).unwrap();

        let decoded_claims = validate_token(&token, secret).unwrap();

        assert_eq!(decoded_claims.sub, "user-42");
        assert_eq!(decoded_claims.name, "Alice");
    }

    #[test]
    fn test_jwt_token_with_wrong_secret() {
        let secret = "test_secret_key";
        let wrong_secret = "wrong_secret_key";

        let claims = Claims::new("user-1", "Alice");
        let token = generate_token(&claims, secret).unwrap();

        assert!(validate_token(&token, wrong_secret).is_err());
    }

    #[test]
    fn test_identify_with_valid_bearer_token() {
        let secret = "test_secret_key";
        let claims = Claims::new("user-7", "Bob");
        let token = generate_token(&claims, secret).unwrap();
        let header = format!("Bearer {}", token);

        match AuthResult::identify(Some(&header), Some(secret)) {
            AuthResult::Authenticated(identity) => {
                assert_eq!(identity.id, "user-7");
                assert_eq!(identity.display_name, "Bob");
            }
            AuthResult::Unauthenticated => panic!("expected authenticated caller"),
        }
    }

    #[test]
    fn test_identify_rejects_incomplete_identity() {
        let secret = "test_secret_key";

        // No display name resolvable: the identity is incomplete.
        let claims = Claims::new("user-7", "  ");
        let token = generate_token(&claims, secret).unwrap();
        let header = format!("Bearer {}", token);

        assert!(matches!(
            AuthResult::identify(Some(&header), Some(secret)),
            AuthResult::Unauthenticated
        ));

        // Missing header entirely.
        assert!(matches!(
            AuthResult::identify(None, Some(secret)),
            AuthResult::Unauthenticated
        ));

        // Require surfaces the unauthorized error.
        assert!(AuthResult::Unauthenticated.require().is_err());
    }
}
