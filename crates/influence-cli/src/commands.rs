//! Subcommand handlers.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use tracing::warn;

use influence_core::models::{
    BrandProfileUpdate, CampaignDraft, CampaignFilter, CampaignStatus, CampaignUpdate,
    InfluencerFilter, InfluencerProfileUpdate, RegistrationExtras, Role,
};
use influence_core::{ApiClient, Config, SessionState, SessionStore};

use crate::cli::{
    BrandCommand, BrandEditArgs, CampaignCommand, CampaignCreateArgs, CampaignUpdateArgs, Command,
    InfluencerCommand, InfluencerListArgs, ProfileCommand, ProfileEditArgs, SavedCommand,
};
use crate::output;

pub async fn run(
    command: Command,
    session: &SessionStore,
    config: &mut Config,
    json: bool,
) -> Result<()> {
    match command {
        Command::Login { email } => login(session, config, email).await,
        Command::Register {
            email,
            role,
            display_name,
            company_name,
        } => {
            let extra = registration_extras(role, display_name, company_name)?;
            register(session, config, email, role, extra).await
        }
        Command::Logout => {
            session.logout().await;
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            let state = require_session(session)?;
            match state.user() {
                Some(user) => output::emit(json, user, |user| {
                    output::print_account(user, state.profile())
                }),
                None => bail!("Not signed in"),
            }
        }
        Command::Influencers(cmd) => {
            require_session(session)?;
            influencers(session.api(), cmd, json).await
        }
        Command::Campaigns(cmd) => {
            let state = require_session(session)?;
            campaigns(session.api(), &state, cmd, json).await
        }
        Command::Saved(cmd) => {
            let state = require_session(session)?;
            require_role(&state, Role::Brand)?;
            saved(session.api(), cmd, json).await
        }
        Command::Profile(cmd) => {
            let state = require_session(session)?;
            require_role(&state, Role::Influencer)?;
            profile(session.api(), cmd, json).await
        }
        Command::Brand(cmd) => {
            let state = require_session(session)?;
            require_role(&state, Role::Brand)?;
            brand(session.api(), cmd, json).await
        }
        Command::Search { query } => {
            require_session(session)?;
            let query = query.join(" ");
            let result = session.api().natural_search(&query).await?;
            output::emit(json, &result, output::print_search)
        }
        Command::Recommend { campaign_id } => {
            require_session(session)?;
            let recs = session.api().recommendations(&campaign_id).await?;
            output::emit(json, &recs, output::print_recommendations)
        }
    }
}

async fn login(session: &SessionStore, config: &mut Config, email: Option<String>) -> Result<()> {
    let email = match email.or_else(|| config.last_email.clone()) {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    let state = session
        .login(&email, &password)
        .await
        .context("Sign-in failed")?;

    remember_email(config, email);
    print_welcome(&state);
    Ok(())
}

async fn register(
    session: &SessionStore,
    config: &mut Config,
    email: String,
    role: Role,
    extra: RegistrationExtras,
) -> Result<()> {
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;
    let confirm =
        rpassword::prompt_password("Confirm password: ").context("Failed to read password")?;
    if password != confirm {
        bail!("Passwords do not match");
    }

    let state = session
        .register(&email, &password, role, &extra)
        .await
        .context("Registration failed")?;

    remember_email(config, email);
    print_welcome(&state);
    Ok(())
}

/// Brands register with a company name, creators with a display name
fn registration_extras(
    role: Role,
    display_name: Option<String>,
    company_name: Option<String>,
) -> Result<RegistrationExtras> {
    match role {
        Role::Brand => match company_name {
            Some(name) if !name.trim().is_empty() => Ok(RegistrationExtras::brand(name)),
            _ => bail!("Brand accounts need --company-name"),
        },
        Role::Influencer => match display_name {
            Some(name) if !name.trim().is_empty() => Ok(RegistrationExtras::influencer(name)),
            _ => bail!("Creator accounts need --display-name"),
        },
    }
}

async fn influencers(api: &ApiClient, cmd: InfluencerCommand, json: bool) -> Result<()> {
    match cmd {
        InfluencerCommand::List(args) => {
            let page = api.list_influencers(&influencer_filter(args)).await?;
            output::emit(json, &page, output::print_influencer_page)
        }
        InfluencerCommand::Show { id } => {
            let profile = api.get_influencer(&id).await?;
            output::emit(json, &profile, output::print_influencer)
        }
    }
}

fn influencer_filter(args: InfluencerListArgs) -> InfluencerFilter {
    InfluencerFilter {
        category: args.category,
        min_followers: args.min_followers,
        max_followers: args.max_followers,
        min_engagement: args.min_engagement,
        location: args.location,
        platform: args.platform,
        sort_by: args.sort,
        page: args.page,
        limit: args.limit,
    }
}

async fn campaigns(
    api: &ApiClient,
    state: &SessionState,
    cmd: CampaignCommand,
    json: bool,
) -> Result<()> {
    match cmd {
        CampaignCommand::List {
            category,
            platform,
            status,
            page,
            limit,
        } => {
            let filter = CampaignFilter {
                category,
                platform,
                status,
                page,
                limit,
            };
            let page = api.list_campaigns(&filter).await?;
            output::emit(json, &page, output::print_campaign_page)
        }
        CampaignCommand::Mine => {
            require_role(state, Role::Brand)?;
            let page = api.my_campaigns().await?;
            output::emit(json, &page, output::print_campaign_page)
        }
        CampaignCommand::Show { id } => {
            let campaign = api.get_campaign(&id).await?;
            output::emit(json, &campaign, output::print_campaign)
        }
        CampaignCommand::Create(args) => {
            require_role(state, Role::Brand)?;
            let campaign = api.create_campaign(&campaign_draft(args)).await?;
            output::emit(json, &campaign, output::print_campaign)
        }
        CampaignCommand::Update(args) => {
            require_role(state, Role::Brand)?;
            let id = args.id.clone();
            let update = campaign_update(args);
            if update == CampaignUpdate::default() {
                bail!("Nothing to update");
            }
            let campaign = api.update_campaign(&id, &update).await?;
            output::emit(json, &campaign, output::print_campaign)
        }
        CampaignCommand::Apply { campaign_id, pitch } => {
            require_role(state, Role::Influencer)?;
            let application = api
                .apply_to_campaign(&campaign_id, pitch.as_deref())
                .await?;
            output::emit(json, &application, |a| {
                println!("Applied to {} (application {}, {})", campaign_id, a.id, a.status.as_str())
            })
        }
        CampaignCommand::Applications { campaign_id } => {
            require_role(state, Role::Brand)?;
            let applications = api.campaign_applications(&campaign_id).await?;
            output::emit(json, applications.as_slice(), output::print_applications)
        }
        CampaignCommand::SetStatus {
            campaign_id,
            application_id,
            status,
        } => {
            require_role(state, Role::Brand)?;
            let application = api
                .update_application_status(&campaign_id, &application_id, status)
                .await?;
            output::emit(json, &application, |a| {
                println!("Application {} is now {}", a.id, a.status.as_str())
            })
        }
        CampaignCommand::MyApplications => {
            require_role(state, Role::Influencer)?;
            let applications = api.my_applications().await?;
            output::emit(json, applications.as_slice(), output::print_applications)
        }
    }
}

fn campaign_draft(args: CampaignCreateArgs) -> CampaignDraft {
    let mut draft = CampaignDraft::new(args.title);
    draft.description = args.description;
    draft.requirements = args.requirements;
    draft.budget = args.budget;
    draft.price_per_influencer = args.price_per_influencer;
    draft.category = args.category;
    draft.min_followers = args.min_followers;
    draft.max_influencers = args.max_influencers;
    if let Some(platform) = args.platform {
        draft.platform = platform;
    }
    if args.publish {
        draft.status = CampaignStatus::Active;
    }
    draft
}

fn campaign_update(args: CampaignUpdateArgs) -> CampaignUpdate {
    CampaignUpdate {
        title: args.title,
        description: args.description,
        requirements: args.requirements,
        budget: args.budget,
        price_per_influencer: args.price_per_influencer,
        category: args.category,
        platform: args.platform,
        status: args.status,
        max_influencers: args.max_influencers,
    }
}

async fn profile(api: &ApiClient, cmd: ProfileCommand, json: bool) -> Result<()> {
    let profile = match cmd {
        ProfileCommand::Show => api.my_influencer_profile().await?,
        ProfileCommand::Edit(args) => {
            let update = profile_update(args);
            if update == InfluencerProfileUpdate::default() {
                bail!("Nothing to update");
            }
            api.update_influencer_profile(&update).await?
        }
    };
    output::emit(json, &profile, output::print_influencer)
}

fn profile_update(args: ProfileEditArgs) -> InfluencerProfileUpdate {
    InfluencerProfileUpdate {
        display_name: args.display_name,
        bio: args.bio,
        avatar_url: args.avatar_url,
        categories: args.categories,
        instagram_handle: args.instagram.map(strip_at),
        tiktok_handle: args.tiktok.map(strip_at),
        youtube_handle: args.youtube.map(strip_at),
        follower_count: args.follower_count,
        engagement_rate: args.engagement_rate,
        price_per_post: args.price_per_post,
        location: args.location,
    }
}

/// Handles are stored without the leading `@`
fn strip_at(handle: String) -> String {
    handle.trim().trim_start_matches('@').to_string()
}

async fn brand(api: &ApiClient, cmd: BrandCommand, json: bool) -> Result<()> {
    let brand = match cmd {
        BrandCommand::Show => api.my_brand_profile().await?,
        BrandCommand::Edit(args) => {
            let update = brand_update(args);
            if update == BrandProfileUpdate::default() {
                bail!("Nothing to update");
            }
            api.update_brand_profile(&update).await?
        }
    };
    output::emit(json, &brand, output::print_brand)
}

fn brand_update(args: BrandEditArgs) -> BrandProfileUpdate {
    BrandProfileUpdate {
        company_name: args.company_name,
        logo_url: args.logo_url,
        industry: args.industry,
        website: args.website,
        description: args.description,
    }
}

async fn saved(api: &ApiClient, cmd: SavedCommand, json: bool) -> Result<()> {
    match cmd {
        SavedCommand::List => {
            let items = api.saved_influencers().await?;
            output::emit(json, items.as_slice(), output::print_influencers)
        }
        SavedCommand::Add { influencer_id } => {
            api.save_influencer(&influencer_id).await?;
            println!("Saved {}", influencer_id);
            Ok(())
        }
        SavedCommand::Remove { influencer_id } => {
            api.unsave_influencer(&influencer_id).await?;
            println!("Removed {}", influencer_id);
            Ok(())
        }
    }
}

/// The session restored at startup, or an error pointing at `login`
fn require_session(session: &SessionStore) -> Result<SessionState> {
    let state = session.snapshot();
    if !state.is_authenticated() {
        bail!("Not signed in. Run `influence login` first.");
    }
    Ok(state)
}

fn require_role(state: &SessionState, role: Role) -> Result<()> {
    match state.role() {
        Some(actual) if actual == role => Ok(()),
        Some(actual) => bail!("This command is for {} accounts (signed in as {})", role, actual),
        None => bail!("Not signed in. Run `influence login` first."),
    }
}

fn remember_email(config: &mut Config, email: String) {
    if config.last_email.as_deref() == Some(email.as_str()) {
        return;
    }
    config.last_email = Some(email);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
}

fn print_welcome(state: &SessionState) {
    let Some(user) = state.user() else { return };
    let name = state
        .profile()
        .map(|p| p.display_name().to_string())
        .unwrap_or_else(|| user.email.clone());
    println!("Signed in as {} ({})", name, user.role);
}

fn prompt(label: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", label)?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read input")?;
    let line = line.trim().to_string();
    if line.is_empty() {
        bail!("No input given");
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use influence_core::models::Platform;

    #[test]
    fn test_registration_extras_by_role() {
        let brand = registration_extras(Role::Brand, None, Some("Acme".into())).unwrap();
        assert_eq!(brand, RegistrationExtras::brand("Acme"));

        let creator = registration_extras(Role::Influencer, Some("Maya".into()), None).unwrap();
        assert_eq!(creator, RegistrationExtras::influencer("Maya"));
    }

    #[test]
    fn test_registration_extras_requires_name() {
        assert!(registration_extras(Role::Brand, Some("Maya".into()), None).is_err());
        assert!(registration_extras(Role::Influencer, None, Some("  ".into())).is_err());
    }

    #[test]
    fn test_campaign_draft_from_args() {
        let draft = campaign_draft(CampaignCreateArgs {
            title: "Launch".into(),
            description: None,
            requirements: None,
            budget: Some(5000.0),
            price_per_influencer: None,
            category: Some("beauty".into()),
            min_followers: None,
            platform: Some(Platform::Instagram),
            publish: true,
            max_influencers: Some(10),
        });
        assert_eq!(draft.title, "Launch");
        assert_eq!(draft.platform, Platform::Instagram);
        assert_eq!(draft.status, CampaignStatus::Active);
        assert_eq!(draft.budget, Some(5000.0));
        assert_eq!(draft.max_influencers, Some(10));
    }

    #[test]
    fn test_campaign_draft_defaults_to_draft() {
        let draft = campaign_draft(CampaignCreateArgs {
            title: "Quiet".into(),
            description: None,
            requirements: None,
            budget: None,
            price_per_influencer: None,
            category: None,
            min_followers: None,
            platform: None,
            publish: false,
            max_influencers: None,
        });
        assert_eq!(draft.status, CampaignStatus::Draft);
        assert_eq!(draft.platform, Platform::Any);
    }

    #[test]
    fn test_profile_update_strips_handle_prefix() {
        let update = profile_update(ProfileEditArgs {
            display_name: None,
            bio: Some("Trail runner".into()),
            avatar_url: None,
            categories: None,
            instagram: Some("@maya.runs".into()),
            tiktok: None,
            youtube: None,
            follower_count: None,
            engagement_rate: None,
            price_per_post: Some(450.0),
            location: None,
        });
        assert_eq!(update.instagram_handle.as_deref(), Some("maya.runs"));
        assert_eq!(update.bio.as_deref(), Some("Trail runner"));
        assert_eq!(update.tiktok_handle, None);
        assert_eq!(update.price_per_post, Some(450.0));
    }

    #[test]
    fn test_empty_edits_map_to_default_updates() {
        let brand = brand_update(BrandEditArgs {
            company_name: None,
            logo_url: None,
            industry: None,
            website: None,
            description: None,
        });
        assert_eq!(brand, BrandProfileUpdate::default());

        let campaign = campaign_update(CampaignUpdateArgs {
            id: "c1".into(),
            title: None,
            description: None,
            requirements: None,
            budget: None,
            price_per_influencer: None,
            category: None,
            platform: None,
            status: Some(CampaignStatus::Completed),
            max_influencers: None,
        });
        assert_eq!(campaign.status, Some(CampaignStatus::Completed));
        assert_ne!(campaign, CampaignUpdate::default());
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(&SessionState::unauthenticated(), Role::Brand).is_err());
    }
}
