//! Campaigns posted by brands and the applications creators send to them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::decimal;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Tiktok,
    Youtube,
    #[default]
    Any,
    #[serde(other)]
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
            Platform::Youtube => "youtube",
            Platform::Any => "any",
            Platform::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" | "ig" => Some(Platform::Instagram),
            "tiktok" => Some(Platform::Tiktok),
            "youtube" | "yt" => Some(Platform::Youtube),
            "any" => Some(Platform::Any),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Active,
    Paused,
    Completed,
    #[serde(other)]
    Unknown,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
            CampaignStatus::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(CampaignStatus::Draft),
            "active" => Some(CampaignStatus::Active),
            "paused" => Some(CampaignStatus::Paused),
            "completed" => Some(CampaignStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Campaign {
    pub id: String,
    pub brand_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default, deserialize_with = "decimal::deserialize_optional")]
    pub budget: Option<f64>,
    #[serde(default, deserialize_with = "decimal::deserialize_optional")]
    pub price_per_influencer: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_followers: Option<i64>,
    #[serde(default)]
    pub min_engagement_rate: Option<f64>,
    pub platform: Platform,
    pub status: CampaignStatus,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub max_influencers: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub application_count: Option<i64>,
}

/// Body for creating a campaign. Only `title` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_influencer: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_followers: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_engagement_rate: Option<f64>,
    pub platform: Platform,
    pub status: CampaignStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_influencers: Option<i64>,
}

impl CampaignDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            requirements: None,
            budget: None,
            price_per_influencer: None,
            category: None,
            min_followers: None,
            min_engagement_rate: None,
            platform: Platform::Any,
            status: CampaignStatus::Draft,
            start_date: None,
            end_date: None,
            max_influencers: None,
        }
    }
}

/// Partial campaign update; unset fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_influencer: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CampaignStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_influencers: Option<i64>,
}

/// Query filters for `GET /api/v1/campaigns/`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignFilter {
    pub category: Option<String>,
    pub platform: Option<Platform>,
    pub status: Option<CampaignStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl CampaignFilter {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(ref category) = self.category {
            query.push(("category".to_string(), category.clone()));
        }
        if let Some(platform) = self.platform {
            query.push(("platform".to_string(), platform.as_str().to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(ApplicationStatus::Pending),
            "accepted" | "accept" => Some(ApplicationStatus::Accepted),
            "rejected" | "reject" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Application {
    pub id: String,
    pub campaign_id: String,
    pub influencer_id: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub pitch: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub influencer_name: Option<String>,
    #[serde(default)]
    pub influencer_avatar: Option<String>,
    #[serde(default)]
    pub campaign_title: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApplyRequest<'a> {
    pub pitch: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusUpdateRequest {
    pub status: ApplicationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_campaign_decodes_server_shape() {
        let campaign: Campaign = serde_json::from_str(
            r#"{
                "id": "c1",
                "brand_id": "b1",
                "title": "Summer Glow",
                "budget": "5000.00",
                "price_per_influencer": 250,
                "platform": "instagram",
                "status": "active",
                "start_date": "2025-06-01",
                "created_at": "2025-05-01T12:00:00Z",
                "brand_name": "Acme Co",
                "application_count": 3
            }"#,
        )
        .unwrap();
        assert_eq!(campaign.platform, Platform::Instagram);
        assert_eq!(campaign.status, CampaignStatus::Active);
        assert_eq!(campaign.budget, Some(5000.0));
        assert_eq!(campaign.price_per_influencer, Some(250.0));
        assert_eq!(campaign.start_date, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(campaign.end_date, None);
    }

    #[test]
    fn test_unknown_enum_values_are_tolerated() {
        let status: CampaignStatus = serde_json::from_str(r#""archived""#).unwrap();
        assert_eq!(status, CampaignStatus::Unknown);
        let platform: Platform = serde_json::from_str(r#""twitch""#).unwrap();
        assert_eq!(platform, Platform::Unknown);
    }

    #[test]
    fn test_draft_serializes_defaults() {
        let draft = CampaignDraft::new("Launch");
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            serde_json::json!({ "title": "Launch", "platform": "any", "status": "draft" })
        );
    }

    #[test]
    fn test_campaign_filter_query() {
        let filter = CampaignFilter {
            platform: Some(Platform::Tiktok),
            status: Some(CampaignStatus::Active),
            limit: Some(50),
            ..Default::default()
        };
        assert_eq!(
            filter.to_query(),
            vec![
                ("platform".to_string(), "tiktok".to_string()),
                ("status".to_string(), "active".to_string()),
                ("limit".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn test_application_status_parse() {
        assert_eq!(ApplicationStatus::parse("Accept"), Some(ApplicationStatus::Accepted));
        assert_eq!(ApplicationStatus::parse("rejected"), Some(ApplicationStatus::Rejected));
        assert_eq!(ApplicationStatus::parse("maybe"), None);
    }
}
