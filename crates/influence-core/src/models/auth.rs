//! Credential-issuing request and response bodies.

use serde::{Deserialize, Serialize};

use super::Role;

/// Access/refresh pair issued by login, register and refresh.
/// Both values are opaque and never decoded locally.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

// Keep token values out of logs and panic messages.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Role-specific attributes sent with a registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationExtras {
    /// Shown on the creator's public profile (influencers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Company name on the brand profile (brands)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

impl RegistrationExtras {
    pub fn brand(company_name: impl Into<String>) -> Self {
        Self {
            company_name: Some(company_name.into()),
            ..Default::default()
        }
    }

    pub fn influencer(display_name: impl Into<String>) -> Self {
        Self {
            display_name: Some(display_name.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
    #[serde(flatten)]
    pub extra: &'a RegistrationExtras,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_debug_is_redacted() {
        let pair = TokenPair {
            access_token: "secret-access".to_string(),
            refresh_token: "secret-refresh".to_string(),
            token_type: "bearer".to_string(),
        };
        let debug = format!("{:?}", pair);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_token_pair_default_type() {
        let pair: TokenPair =
            serde_json::from_str(r#"{"access_token":"a","refresh_token":"r"}"#).unwrap();
        assert_eq!(pair.token_type, "bearer");
    }

    #[test]
    fn test_register_request_flattens_extras() {
        let extra = RegistrationExtras::brand("Acme");
        let body = RegisterRequest {
            email: "brand1@example.com",
            password: "password123",
            role: Role::Brand,
            extra: &extra,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "email": "brand1@example.com",
                "password": "password123",
                "role": "brand",
                "company_name": "Acme"
            })
        );
    }
}
