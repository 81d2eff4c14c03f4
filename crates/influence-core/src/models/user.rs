//! Account identity and the role-tagged profile returned by `/auth/me`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{BrandProfile, InfluencerProfile};

/// Marketplace side an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Brand,
    Influencer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Brand => "brand",
            Role::Influencer => "influencer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brand" => Some(Role::Brand),
            "influencer" | "creator" => Some(Role::Influencer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Profile attached to a user, shaped by the user's role.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Profile {
    Influencer(InfluencerProfile),
    Brand(BrandProfile),
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Profile::Influencer(_) => Role::Influencer,
            Profile::Brand(_) => Role::Brand,
        }
    }

    /// Name shown for the account: display name or company name
    pub fn display_name(&self) -> &str {
        match self {
            Profile::Influencer(p) => &p.display_name,
            Profile::Brand(p) => &p.company_name,
        }
    }

    pub fn as_influencer(&self) -> Option<&InfluencerProfile> {
        match self {
            Profile::Influencer(p) => Some(p),
            Profile::Brand(_) => None,
        }
    }

    pub fn as_brand(&self) -> Option<&BrandProfile> {
        match self {
            Profile::Brand(p) => Some(p),
            Profile::Influencer(_) => None,
        }
    }
}

/// Raw `/auth/me` body. The profile arrives untagged, so it is decoded
/// according to the user's role in [`MeResponse::into_parts`].
#[derive(Debug, Deserialize)]
pub(crate) struct MeResponse {
    pub user: User,
    #[serde(default)]
    pub profile: Option<Value>,
}

impl MeResponse {
    pub fn into_parts(self) -> serde_json::Result<(User, Option<Profile>)> {
        let profile = match self.profile {
            None | Some(Value::Null) => None,
            Some(raw) => Some(match self.user.role {
                Role::Influencer => Profile::Influencer(serde_json::from_value(raw)?),
                Role::Brand => Profile::Brand(serde_json::from_value(raw)?),
            }),
        };
        Ok((self.user, profile))
    }
}
