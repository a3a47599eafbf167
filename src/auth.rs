// src/auth.rs
// DOCUMENTATION: Bearer token authentication
// PURPOSE: Verify access tokens issued by the hosted auth provider and expose the caller

use crate::config::Config;
use crate::errors::TravelError;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use uuid::Uuid;

/// Claims carried by provider-issued access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id (UUID)
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Authenticated caller, extracted from `Authorization: Bearer <token>`
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// Caller that may be anonymous. A malformed or expired token is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthenticatedUser>);

impl MaybeUser {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|u| u.user_id)
    }
}

/// Decode and verify a token against the shared secret
pub fn verify_token(token: &str, secret: &str) -> Result<AuthenticatedUser, TravelError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);
    // Provider tokens carry aud = "authenticated"
    validation.validate_aud = false;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        log::warn!("Rejected access token: {}", e);
        TravelError::Unauthorized("invalid token".to_string())
    })?;

    let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| {
        log::warn!("Access token subject is not a UUID");
        TravelError::Unauthorized("invalid token subject".to_string())
    })?;

    Ok(AuthenticatedUser {
        user_id,
        email: data.claims.email,
    })
}

fn bearer_token(req: &HttpRequest) -> Option<Result<&str, TravelError>> {
    let header = req.headers().get("Authorization")?;
    let value = match header.to_str() {
        Ok(v) => v,
        Err(_) => {
            return Some(Err(TravelError::Unauthorized(
                "malformed authorization header".to_string(),
            )))
        }
    };
    Some(value.strip_prefix("Bearer ").ok_or_else(|| {
        TravelError::Unauthorized("expected bearer token".to_string())
    }))
}

fn authenticate(req: &HttpRequest) -> Result<Option<AuthenticatedUser>, TravelError> {
    let token = match bearer_token(req) {
        None => return Ok(None),
        Some(token) => token?,
    };

    let config = req.app_data::<web::Data<Config>>().ok_or_else(|| {
        log::error!("Config missing from application data");
        TravelError::ServiceUnavailable("authentication not configured".to_string())
    })?;

    verify_token(token, &config.jwt_secret).map(Some)
}

impl FromRequest for AuthenticatedUser {
    type Error = TravelError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|user| {
            user.ok_or_else(|| TravelError::Unauthorized("missing bearer token".to_string()))
        }))
    }
}

impl FromRequest for MaybeUser {
    type Error = TravelError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(MaybeUser))
    }
}

#[cfg(test)]
pub(crate) fn issue_test_token(secret: &str, user_id: Uuid, exp_offset_secs: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let exp = (chrono::Utc::now().timestamp() + exp_offset_secs) as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
        email: Some("traveler@example.com".to_string()),
        role: Some("authenticated".to_string()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use actix_web::test::TestRequest;

    #[test]
    fn test_verify_valid_token() {
        let user_id = Uuid::new_v4();
        let token = issue_test_token("secret", user_id, 3600);
        let user = verify_token(&token, "secret").unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.email.as_deref(), Some("traveler@example.com"));
    }

    #[test]
    fn test_verify_rejects_wrong_secret_and_expired() {
        let user_id = Uuid::new_v4();
        let token = issue_test_token("secret", user_id, 3600);
        assert!(verify_token(&token, "other").is_err());

        let expired = issue_test_token("secret", user_id, -3600);
        assert!(verify_token(&expired, "secret").is_err());
    }

    #[actix_web::test]
    async fn test_extractors() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let token = issue_test_token(&config.jwt_secret, user_id, 3600);

        let req = TestRequest::default()
            .app_data(web::Data::new(config.clone()))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();
        let user = AuthenticatedUser::extract(&req).await.unwrap();
        assert_eq!(user.user_id, user_id);

        let anonymous = TestRequest::default()
            .app_data(web::Data::new(config.clone()))
            .to_http_request();
        assert!(AuthenticatedUser::extract(&anonymous).await.is_err());
        assert!(MaybeUser::extract(&anonymous).await.unwrap().0.is_none());

        let garbage = TestRequest::default()
            .app_data(web::Data::new(config))
            .insert_header(("Authorization", "Bearer nope"))
            .to_http_request();
        assert!(MaybeUser::extract(&garbage).await.is_err());
    }
}
