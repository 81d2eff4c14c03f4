//! API client for the influencer marketplace REST API.
//!
//! `ApiClient` provides typed methods for every endpoint the app consumes.
//! All of them go through the shared [`Pipeline`], so bearer attachment and
//! token refresh apply uniformly.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;

use super::error::{ApiError, Result};
use super::pipeline::{ApiRequest, AuthEvent, Pipeline};
use crate::auth::CredentialStore;
use crate::config::Config;
use crate::models::auth::{LoginRequest, RegisterRequest};
use crate::models::campaign::{ApplyRequest, StatusUpdateRequest};
use crate::models::search::NaturalSearchRequest;
use crate::models::user::MeResponse;
use crate::models::{
    Application, ApplicationStatus, BrandProfile, BrandProfileUpdate, Campaign, CampaignDraft,
    CampaignFilter, CampaignUpdate, InfluencerFilter, InfluencerProfile, InfluencerProfileUpdate,
    NaturalSearchResult, Page, Profile, Recommendations, RegistrationExtras, Role, TokenPair, User,
};

// ============================================================================
// Constants
// ============================================================================

const AUTH_LOGIN: &str = "/api/v1/auth/login";
const AUTH_REGISTER: &str = "/api/v1/auth/register";
const AUTH_ME: &str = "/api/v1/auth/me";

const INFLUENCERS: &str = "/api/v1/influencers";
const CAMPAIGNS: &str = "/api/v1/campaigns";
const BRANDS_ME: &str = "/api/v1/brands/me";
const SEARCH: &str = "/api/v1/search";

/// API client for the marketplace.
/// Clone is cheap - the pipeline is shared behind an Arc.
#[derive(Clone)]
pub struct ApiClient {
    pipeline: Pipeline,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str, timeout: Duration, credentials: CredentialStore) -> Result<Self> {
        Ok(Self {
            pipeline: Pipeline::new(base_url, timeout, credentials)?,
        })
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &Config, credentials: CredentialStore) -> Result<Self> {
        Self::new(&config.api_base_url, config.request_timeout(), credentials)
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn credentials(&self) -> &CredentialStore {
        self.pipeline.credentials()
    }

    /// Receive token refresh / revocation events
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.pipeline.subscribe()
    }

    // ===== Request helpers =====

    async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.pipeline.execute(request).await?;
        Ok(response.json().await?)
    }

    async fn send_empty(&self, request: ApiRequest) -> Result<()> {
        self.pipeline.execute(request).await?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::get(path)).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        self.send(ApiRequest::post(path, body)?).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        self.send(ApiRequest::put(path, body)?).await
    }

    // ===== Authentication =====

    /// Exchange email and password for a token pair
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        let request = ApiRequest::post(AUTH_LOGIN, &LoginRequest { email, password })?.without_refresh();
        self.send(request).await
    }

    /// Create an account and receive its first token pair
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: Role,
        extra: &RegistrationExtras,
    ) -> Result<TokenPair> {
        let body = RegisterRequest {
            email,
            password,
            role,
            extra,
        };
        let request = ApiRequest::post(AUTH_REGISTER, &body)?.without_refresh();
        self.send(request).await
    }

    /// Fetch the signed-in identity and its role-specific profile
    pub async fn me(&self) -> Result<(User, Option<Profile>)> {
        let me: MeResponse = self.get(AUTH_ME).await?;
        me.into_parts()
            .map_err(|e| ApiError::InvalidResponse(format!("profile does not match role: {}", e)))
    }

    // ===== Influencers =====

    /// Browse creators with filters
    pub async fn list_influencers(&self, filter: &InfluencerFilter) -> Result<Page<InfluencerProfile>> {
        let request = ApiRequest::get(format!("{}/", INFLUENCERS)).with_query(filter.to_query());
        self.send(request).await
    }

    pub async fn get_influencer(&self, id: &str) -> Result<InfluencerProfile> {
        self.get(&format!("{}/{}", INFLUENCERS, id)).await
    }

    pub async fn my_influencer_profile(&self) -> Result<InfluencerProfile> {
        self.get(&format!("{}/me", INFLUENCERS)).await
    }

    pub async fn update_influencer_profile(
        &self,
        update: &InfluencerProfileUpdate,
    ) -> Result<InfluencerProfile> {
        self.put(&format!("{}/me", INFLUENCERS), update).await
    }

    /// Applications the signed-in creator has sent
    pub async fn my_applications(&self) -> Result<Vec<Application>> {
        self.get(&format!("{}/me/applications", INFLUENCERS)).await
    }

    // ===== Campaigns =====

    pub async fn list_campaigns(&self, filter: &CampaignFilter) -> Result<Page<Campaign>> {
        let request = ApiRequest::get(format!("{}/", CAMPAIGNS)).with_query(filter.to_query());
        self.send(request).await
    }

    /// Campaigns owned by the signed-in brand
    pub async fn my_campaigns(&self) -> Result<Page<Campaign>> {
        self.get(&format!("{}/mine", CAMPAIGNS)).await
    }

    pub async fn get_campaign(&self, id: &str) -> Result<Campaign> {
        self.get(&format!("{}/{}", CAMPAIGNS, id)).await
    }

    pub async fn create_campaign(&self, draft: &CampaignDraft) -> Result<Campaign> {
        self.post(&format!("{}/", CAMPAIGNS), draft).await
    }

    pub async fn update_campaign(&self, id: &str, update: &CampaignUpdate) -> Result<Campaign> {
        self.put(&format!("{}/{}", CAMPAIGNS, id), update).await
    }

    pub async fn apply_to_campaign(&self, campaign_id: &str, pitch: Option<&str>) -> Result<Application> {
        self.post(
            &format!("{}/{}/apply", CAMPAIGNS, campaign_id),
            &ApplyRequest { pitch },
        )
        .await
    }

    /// Applications received for one of the brand's campaigns
    pub async fn campaign_applications(&self, campaign_id: &str) -> Result<Vec<Application>> {
        self.get(&format!("{}/{}/applications", CAMPAIGNS, campaign_id)).await
    }

    pub async fn update_application_status(
        &self,
        campaign_id: &str,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<Application> {
        self.put(
            &format!("{}/{}/applications/{}", CAMPAIGNS, campaign_id, application_id),
            &StatusUpdateRequest { status },
        )
        .await
    }

    // ===== Brands =====

    pub async fn my_brand_profile(&self) -> Result<BrandProfile> {
        self.get(BRANDS_ME).await
    }

    pub async fn update_brand_profile(&self, update: &BrandProfileUpdate) -> Result<BrandProfile> {
        self.put(BRANDS_ME, update).await
    }

    pub async fn saved_influencers(&self) -> Result<Vec<InfluencerProfile>> {
        self.get(&format!("{}/saved", BRANDS_ME)).await
    }

    pub async fn save_influencer(&self, influencer_id: &str) -> Result<()> {
        let request = ApiRequest::new(
            reqwest::Method::POST,
            format!("{}/saved/{}", BRANDS_ME, influencer_id),
        );
        self.send_empty(request).await
    }

    pub async fn unsave_influencer(&self, influencer_id: &str) -> Result<()> {
        self.send_empty(ApiRequest::delete(format!("{}/saved/{}", BRANDS_ME, influencer_id)))
            .await
    }

    // ===== Search =====

    /// Free-text creator search; the server interprets the query
    pub async fn natural_search(&self, query: &str) -> Result<NaturalSearchResult> {
        self.post(&format!("{}/natural", SEARCH), &NaturalSearchRequest { query })
            .await
    }

    pub async fn recommendations(&self, campaign_id: &str) -> Result<Recommendations> {
        self.get(&format!("{}/recommendations/{}", SEARCH, campaign_id)).await
    }
}

// ============================================================================
// Tests
// ============================================================================
