//! Server-side search results. Query interpretation happens on the server;
//! the interpreted filters are passed back verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::InfluencerProfile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaturalSearchResult {
    pub query: String,
    #[serde(default)]
    pub interpreted_filters: Map<String, Value>,
    pub results: Vec<InfluencerProfile>,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct NaturalSearchRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub campaign_id: String,
    pub recommendations: Vec<InfluencerProfile>,
    #[serde(default)]
    pub reasoning: Option<String>,
}
