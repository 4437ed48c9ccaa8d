//! Acting-user context
//!
//! Authentication itself is an external collaborator: tokens are issued
//! elsewhere and arrive as `Authorization: Bearer ...` headers. This module
//! only validates them into a [`CurrentUser`] that the core operations
//! take as the acting user. Requests without a resolvable user count as
//! unauthenticated (`None`); every mutation that requires staff identity
//! rejects those before touching the store.

mod extractor;

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Staff role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Employee,
}

/// Resolved acting user attached per request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub role: Role,
    /// Employees belong to an admin account; `None` for admins themselves
    pub parent_user: Option<String>,
}

impl CurrentUser {
    /// The admin account whose catalog and external orders this user works
    /// against: the parent for employees, the user itself for admins.
    pub fn tenant_id(&self) -> &str {
        self.parent_user.as_deref().unwrap_or(&self.id)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// JWT claims carried by staff tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub parent_user: Option<String>,
    pub exp: i64,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
            parent_user: claims.parent_user,
        }
    }
}

/// Token validation service (HS256)
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Extract the token from an `Authorization` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }

    /// Validate a token and resolve the acting user
    pub fn validate_token(&self, token: &str) -> Result<CurrentUser, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(CurrentUser::from(data.claims))
    }

    /// Mint a token for the given user. Issuance is not exposed over the
    /// API; this exists for tests and operator tooling.
    pub fn generate_token(
        &self,
        user: &CurrentUser,
        ttl_secs: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            parent_user: user.parent_user.clone(),
            exp: chrono::Utc::now().timestamp() + ttl_secs,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff() -> CurrentUser {
        CurrentUser {
            id: "emp-7".to_string(),
            username: "mario".to_string(),
            role: Role::Employee,
            parent_user: Some("admin-1".to_string()),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let service = JwtService::new("test-secret");
        let token = service.generate_token(&staff(), 60).unwrap();

        let user = service.validate_token(&token).unwrap();
        assert_eq!(user.id, "emp-7");
        assert_eq!(user.role, Role::Employee);
        assert_eq!(user.tenant_id(), "admin-1");
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = JwtService::new("test-secret");
        let token = service.generate_token(&staff(), -120).unwrap();
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtService::new("secret-a");
        let verifier = JwtService::new("secret-b");
        let token = issuer.generate_token(&staff(), 60).unwrap();
        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn test_tenant_of_admin_is_self() {
        let admin = CurrentUser {
            id: "admin-1".to_string(),
            username: "boss".to_string(),
            role: Role::Admin,
            parent_user: None,
        };
        assert_eq!(admin.tenant_id(), "admin-1");
        assert!(admin.is_admin());
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
