//! Creator profiles and the search filters used to browse them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::decimal;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct InfluencerProfile {
    pub id: String,
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub instagram_handle: Option<String>,
    #[serde(default)]
    pub tiktok_handle: Option<String>,
    #[serde(default)]
    pub youtube_handle: Option<String>,
    #[serde(default)]
    pub follower_count: i64,
    #[serde(default)]
    pub engagement_rate: f64,
    #[serde(default)]
    pub avg_likes: i64,
    #[serde(default)]
    pub avg_comments: i64,
    #[serde(default)]
    pub audience_top_country: Option<String>,
    #[serde(default)]
    pub audience_age_range: Option<String>,
    #[serde(default)]
    pub audience_gender_split: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub authenticity_score: f64,
    #[serde(default)]
    pub fake_follower_pct: f64,
    #[serde(default, deserialize_with = "decimal::deserialize_optional")]
    pub price_per_post: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

impl InfluencerProfile {
    /// Social handles that are set, as (platform, handle) pairs
    pub fn handles(&self) -> Vec<(&'static str, &str)> {
        [
            ("instagram", &self.instagram_handle),
            ("tiktok", &self.tiktok_handle),
            ("youtube", &self.youtube_handle),
        ]
        .into_iter()
        .filter_map(|(platform, handle)| {
            handle
                .as_deref()
                .filter(|h| !h.is_empty())
                .map(|h| (platform, h))
        })
        .collect()
    }
}

/// Partial update for the signed-in creator's profile. Unset fields are
/// left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfluencerProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiktok_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follower_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engagement_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_post: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Sort keys accepted by the influencer listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfluencerSort {
    #[default]
    FollowerCount,
    EngagementRate,
    AuthenticityScore,
    PricePerPost,
}

impl InfluencerSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfluencerSort::FollowerCount => "follower_count",
            InfluencerSort::EngagementRate => "engagement_rate",
            InfluencerSort::AuthenticityScore => "authenticity_score",
            InfluencerSort::PricePerPost => "price_per_post",
        }
    }
}

/// Query filters for `GET /api/v1/influencers/`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfluencerFilter {
    pub category: Option<String>,
    pub min_followers: Option<i64>,
    pub max_followers: Option<i64>,
    pub min_engagement: Option<f64>,
    pub location: Option<String>,
    pub platform: Option<String>,
    pub sort_by: Option<InfluencerSort>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl InfluencerFilter {
    /// Render set filters as query pairs; unset filters are omitted.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                query.push((key.to_string(), value));
            }
        };
        push("category", self.category.clone());
        push("min_followers", self.min_followers.map(|v| v.to_string()));
        push("max_followers", self.max_followers.map(|v| v.to_string()));
        push("min_engagement", self.min_engagement.map(|v| v.to_string()));
        push("location", self.location.clone());
        push("platform", self.platform.clone());
        push("sort_by", self.sort_by.map(|s| s.as_str().to_string()));
        push("page", self.page.map(|v| v.to_string()));
        push("limit", self.limit.map(|v| v.to_string()));
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_to_query_skips_unset() {
        let filter = InfluencerFilter {
            category: Some("fitness".to_string()),
            min_followers: Some(10_000),
            sort_by: Some(InfluencerSort::EngagementRate),
            page: Some(2),
            ..Default::default()
        };
        assert_eq!(
            filter.to_query(),
            vec![
                ("category".to_string(), "fitness".to_string()),
                ("min_followers".to_string(), "10000".to_string()),
                ("sort_by".to_string(), "engagement_rate".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
        assert!(InfluencerFilter::default().to_query().is_empty());
    }

    #[test]
    fn test_profile_defaults_and_handles() {
        let profile: InfluencerProfile = serde_json::from_str(
            r#"{"id":"i1","user_id":"u1","display_name":"Sam","instagram_handle":"@sam","tiktok_handle":""}"#,
        )
        .unwrap();
        assert_eq!(profile.follower_count, 0);
        assert!(!profile.is_verified);
        assert_eq!(profile.handles(), vec![("instagram", "@sam")]);
    }

    #[test]
    fn test_update_serializes_only_set_fields() {
        let update = InfluencerProfileUpdate {
            bio: Some("Trail runner".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({ "bio": "Trail runner" })
        );
    }
}
