//! Terminal rendering for marketplace entities.

use anyhow::{Context, Result};
use serde::Serialize;

use influence_core::models::{
    Application, BrandProfile, Campaign, InfluencerProfile, NaturalSearchResult, Page, Profile,
    Recommendations, User,
};
use influence_core::utils::{format_count, format_money, format_optional, format_percent, truncate};

/// Width of the name column in listings
const NAME_WIDTH: usize = 28;

/// Print `value` as pretty JSON when `json` is set, otherwise via `render`
pub fn emit<T, F>(json: bool, value: &T, render: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T),
{
    if json {
        let text = serde_json::to_string_pretty(value).context("Failed to encode output")?;
        println!("{}", text);
    } else {
        render(value);
    }
    Ok(())
}

pub fn print_account(user: &User, profile: Option<&Profile>) {
    println!("{} ({})", user.email, user.role);
    println!("  id:      {}", user.id);
    println!("  joined:  {}", user.created_at.format("%Y-%m-%d"));
    match profile {
        Some(profile) => println!("  profile: {}", profile.display_name()),
        None => println!("  profile: (none)"),
    }
}

pub fn influencer_row(p: &InfluencerProfile) -> String {
    let verified = if p.is_verified { " ✓" } else { "" };
    let name = truncate(&format!("{}{}", p.display_name, verified), NAME_WIDTH);
    format!(
        "{:<36}  {:<width$}  {:>7}  {:>6}  {:>10}  {}",
        p.id,
        name,
        format_count(p.follower_count),
        format_percent(p.engagement_rate),
        format_money(p.price_per_post),
        format_optional(&p.location, "-"),
        width = NAME_WIDTH,
    )
}

pub fn print_influencers(items: &[InfluencerProfile]) {
    if items.is_empty() {
        println!("No creators found.");
        return;
    }
    for p in items {
        println!("{}", influencer_row(p));
    }
}

pub fn print_influencer_page(page: &Page<InfluencerProfile>) {
    print_influencers(&page.items);
    print_page_footer(page);
}

pub fn print_influencer(p: &InfluencerProfile) {
    println!("{}{}", p.display_name, if p.is_verified { " (verified)" } else { "" });
    if let Some(ref bio) = p.bio {
        println!("  {}", bio);
    }
    println!("  followers:     {}", format_count(p.follower_count));
    println!("  engagement:    {}", format_percent(p.engagement_rate));
    println!("  authenticity:  {:.0}/100", p.authenticity_score);
    println!("  price / post:  {}", format_money(p.price_per_post));
    println!("  location:      {}", format_optional(&p.location, "-"));
    if let Some(ref categories) = p.categories {
        println!("  categories:    {}", categories.join(", "));
    }
    for (platform, handle) in p.handles() {
        println!("  {:<14} @{}", format!("{}:", platform), handle);
    }
}

pub fn print_brand(b: &BrandProfile) {
    println!("{}", b.company_name);
    println!("  industry:      {}", format_optional(&b.industry, "-"));
    println!("  website:       {}", format_optional(&b.website, "-"));
    if let Some(ref description) = b.description {
        println!("  {}", description);
    }
}

pub fn campaign_row(c: &Campaign) -> String {
    format!(
        "{:<36}  {:<width$}  {:<9}  {:<9}  {:>10}  {}",
        c.id,
        truncate(&c.title, NAME_WIDTH),
        c.platform.as_str(),
        c.status.as_str(),
        format_money(c.budget),
        format_optional(&c.brand_name, "-"),
        width = NAME_WIDTH,
    )
}

pub fn print_campaign_page(page: &Page<Campaign>) {
    if page.items.is_empty() {
        println!("No campaigns found.");
        return;
    }
    for c in &page.items {
        println!("{}", campaign_row(c));
    }
    print_page_footer(page);
}

pub fn print_campaign(c: &Campaign) {
    println!("{} [{}]", c.title, c.status.as_str());
    if let Some(ref brand) = c.brand_name {
        println!("  brand:         {}", brand);
    }
    if let Some(ref description) = c.description {
        println!("  {}", description);
    }
    println!("  platform:      {}", c.platform.as_str());
    println!("  budget:        {}", format_money(c.budget));
    println!("  per creator:   {}", format_money(c.price_per_influencer));
    if let Some(min) = c.min_followers {
        println!("  min followers: {}", format_count(min));
    }
    if let (Some(start), Some(end)) = (c.start_date, c.end_date) {
        println!("  runs:          {} to {}", start, end);
    }
    if let Some(count) = c.application_count {
        println!("  applications:  {}", count);
    }
}

pub fn print_applications(items: &[Application]) {
    if items.is_empty() {
        println!("No applications.");
        return;
    }
    for a in items {
        let who = a
            .influencer_name
            .as_deref()
            .or(a.campaign_title.as_deref())
            .unwrap_or(&a.influencer_id);
        println!(
            "{:<36}  {:<9}  {:<width$}  {}",
            a.id,
            a.status.as_str(),
            truncate(who, NAME_WIDTH),
            a.pitch.as_deref().map(|p| truncate(p, 40)).unwrap_or_default(),
            width = NAME_WIDTH,
        );
    }
}

pub fn print_search(result: &NaturalSearchResult) {
    if !result.interpreted_filters.is_empty() {
        let filters: Vec<String> = result
            .interpreted_filters
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        println!("Interpreted as: {}", filters.join(", "));
    }
    print_influencers(&result.results);
    println!("{} match(es)", result.total);
}

pub fn print_recommendations(recs: &Recommendations) {
    if let Some(ref reasoning) = recs.reasoning {
        println!("{}", reasoning);
        println!();
    }
    print_influencers(&recs.recommendations);
}

fn print_page_footer<T>(page: &Page<T>) {
    println!(
        "page {} of {} ({} total){}",
        page.page,
        page.total_pages().max(1),
        page.total,
        if page.has_more() { ", use --page for more" } else { "" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_influencer_row_columns() {
        let p: InfluencerProfile = serde_json::from_value(json!({
            "id": "i1",
            "user_id": "u1",
            "display_name": "Maya Creates",
            "follower_count": 120000,
            "engagement_rate": 4.2,
            "price_per_post": "850.00",
            "location": "Austin, TX",
            "is_verified": true
        }))
        .unwrap();
        let row = influencer_row(&p);
        assert!(row.starts_with("i1"));
        assert!(row.contains("Maya Creates ✓"));
        assert!(row.contains("120K"));
        assert!(row.contains("4.2%"));
        assert!(row.contains("$850.00"));
        assert!(row.ends_with("Austin, TX"));
    }

    #[test]
    fn test_campaign_row_truncates_title() {
        let c: Campaign = serde_json::from_value(json!({
            "id": "c1",
            "brand_id": "b1",
            "title": "A very long campaign title that will not fit",
            "platform": "tiktok",
            "status": "active",
            "created_at": "2025-05-01T12:00:00Z"
        }))
        .unwrap();
        let row = campaign_row(&c);
        assert!(row.contains("A very long campaign titl..."));
        assert!(row.contains("tiktok"));
        assert!(row.contains("active"));
        assert!(row.ends_with("-"));
    }
}
