//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand};

use influence_core::models::{
    ApplicationStatus, CampaignStatus, InfluencerSort, Platform, Role,
};

#[derive(Debug, Parser)]
#[command(name = "influence", version, about = "Influencer marketplace client")]
pub struct Cli {
    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    pub json: bool,

    /// Override the configured API base URL
    #[arg(long, global = true, env = "INFLUENCE_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, value_parser = parse_role)]
        role: Role,
        /// Public name for creator accounts
        #[arg(long)]
        display_name: Option<String>,
        /// Company name for brand accounts
        #[arg(long)]
        company_name: Option<String>,
    },

    /// Forget stored credentials
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Browse creators
    #[command(subcommand)]
    Influencers(InfluencerCommand),

    /// Browse, create and apply to campaigns
    #[command(subcommand)]
    Campaigns(CampaignCommand),

    /// Manage a brand's saved creators
    #[command(subcommand)]
    Saved(SavedCommand),

    /// View or edit your creator profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// View or edit your brand profile
    #[command(subcommand)]
    Brand(BrandCommand),

    /// Search creators in plain language
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Creators recommended for a campaign
    Recommend { campaign_id: String },
}

#[derive(Debug, Subcommand)]
pub enum InfluencerCommand {
    /// List creators matching filters
    List(InfluencerListArgs),
    /// Show one creator
    Show { id: String },
}

#[derive(Debug, Args)]
pub struct InfluencerListArgs {
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub min_followers: Option<i64>,
    #[arg(long)]
    pub max_followers: Option<i64>,
    #[arg(long)]
    pub min_engagement: Option<f64>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub platform: Option<String>,
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<InfluencerSort>,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Debug, Subcommand)]
pub enum CampaignCommand {
    /// List open campaigns
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_parser = parse_platform)]
        platform: Option<Platform>,
        #[arg(long, value_parser = parse_campaign_status)]
        status: Option<CampaignStatus>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// List the signed-in brand's campaigns
    Mine,
    /// Show one campaign
    Show { id: String },
    /// Create a campaign (brands)
    Create(CampaignCreateArgs),
    /// Change a campaign's details or status (brands)
    Update(CampaignUpdateArgs),
    /// Apply to a campaign (creators)
    Apply {
        campaign_id: String,
        #[arg(long)]
        pitch: Option<String>,
    },
    /// List applications to a campaign (brands)
    Applications { campaign_id: String },
    /// Accept or reject an application (brands)
    SetStatus {
        campaign_id: String,
        application_id: String,
        #[arg(value_parser = parse_application_status)]
        status: ApplicationStatus,
    },
    /// Applications the signed-in creator has sent
    MyApplications,
}

#[derive(Debug, Args)]
pub struct CampaignCreateArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub requirements: Option<String>,
    #[arg(long)]
    pub budget: Option<f64>,
    #[arg(long)]
    pub price_per_influencer: Option<f64>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub min_followers: Option<i64>,
    #[arg(long, value_parser = parse_platform)]
    pub platform: Option<Platform>,
    /// Publish immediately instead of saving as a draft
    #[arg(long)]
    pub publish: bool,
    #[arg(long)]
    pub max_influencers: Option<i64>,
}

#[derive(Debug, Args)]
pub struct CampaignUpdateArgs {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub requirements: Option<String>,
    #[arg(long)]
    pub budget: Option<f64>,
    #[arg(long)]
    pub price_per_influencer: Option<f64>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, value_parser = parse_platform)]
    pub platform: Option<Platform>,
    #[arg(long, value_parser = parse_campaign_status)]
    pub status: Option<CampaignStatus>,
    #[arg(long)]
    pub max_influencers: Option<i64>,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    Show,
    /// Update fields of your profile; unset flags are left as they are
    Edit(ProfileEditArgs),
}

#[derive(Debug, Args)]
pub struct ProfileEditArgs {
    #[arg(long)]
    pub display_name: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
    #[arg(long)]
    pub avatar_url: Option<String>,
    /// Comma-separated, e.g. fitness,travel
    #[arg(long, value_delimiter = ',')]
    pub categories: Option<Vec<String>>,
    #[arg(long)]
    pub instagram: Option<String>,
    #[arg(long)]
    pub tiktok: Option<String>,
    #[arg(long)]
    pub youtube: Option<String>,
    #[arg(long)]
    pub follower_count: Option<i64>,
    #[arg(long)]
    pub engagement_rate: Option<f64>,
    #[arg(long)]
    pub price_per_post: Option<f64>,
    #[arg(long)]
    pub location: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum BrandCommand {
    Show,
    /// Update fields of your brand profile
    Edit(BrandEditArgs),
}

#[derive(Debug, Args)]
pub struct BrandEditArgs {
    #[arg(long)]
    pub company_name: Option<String>,
    #[arg(long)]
    pub logo_url: Option<String>,
    #[arg(long)]
    pub industry: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum SavedCommand {
    List,
    Add { influencer_id: String },
    Remove { influencer_id: String },
}

fn parse_role(s: &str) -> Result<Role, String> {
    Role::parse(s).ok_or_else(|| format!("unknown role '{}' (expected brand or influencer)", s))
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    Platform::parse(s)
        .ok_or_else(|| format!("unknown platform '{}' (instagram, tiktok, youtube, any)", s))
}

fn parse_campaign_status(s: &str) -> Result<CampaignStatus, String> {
    CampaignStatus::parse(s)
        .ok_or_else(|| format!("unknown status '{}' (draft, active, paused, completed)", s))
}

fn parse_application_status(s: &str) -> Result<ApplicationStatus, String> {
    ApplicationStatus::parse(s)
        .ok_or_else(|| format!("unknown status '{}' (pending, accepted, rejected)", s))
}

fn parse_sort(s: &str) -> Result<InfluencerSort, String> {
    match s {
        "followers" | "follower_count" => Ok(InfluencerSort::FollowerCount),
        "engagement" | "engagement_rate" => Ok(InfluencerSort::EngagementRate),
        "authenticity" | "authenticity_score" => Ok(InfluencerSort::AuthenticityScore),
        "price" | "price_per_post" => Ok(InfluencerSort::PricePerPost),
        _ => Err(format!("unknown sort key '{}'", s)),
    }
}
