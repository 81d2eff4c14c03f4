//! Data models for marketplace entities.
//!
//! This module contains the structures exchanged with the platform API:
//!
//! - `User`, `Role`, `Profile`: account identity and role-specific profile
//! - `TokenPair`, `RegistrationExtras`: credential issuing
//! - `InfluencerProfile`, `BrandProfile`: the two sides of the marketplace
//! - `Campaign`, `Application`: brand campaigns and creator applications
//! - `NaturalSearchResult`, `Recommendations`: server-side search

pub mod auth;
pub mod brand;
pub mod campaign;
pub(crate) mod decimal;
pub mod influencer;
pub mod search;
pub mod user;

use serde::{Deserialize, Serialize};

pub use auth::{RegistrationExtras, TokenPair};
pub use brand::{BrandProfile, BrandProfileUpdate};
pub use campaign::{
    Application, ApplicationStatus, Campaign, CampaignDraft, CampaignFilter, CampaignStatus,
    CampaignUpdate, Platform,
};
pub use influencer::{InfluencerFilter, InfluencerProfile, InfluencerProfileUpdate, InfluencerSort};
pub use search::{NaturalSearchResult, Recommendations};
pub use user::{Profile, Role, User};

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> Page<T> {
    /// Whether more items exist beyond this page
    pub fn has_more(&self) -> bool {
        self.page.saturating_mul(self.limit) < self.total
    }

    pub fn total_pages(&self) -> i64 {
        if self.limit <= 0 {
            return 0;
        }
        (self.total + self.limit - 1) / self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_has_more() {
        let page = Page {
            items: vec![1, 2],
            total: 5,
            page: 1,
            limit: 2,
        };
        assert!(page.has_more());
        assert_eq!(page.total_pages(), 3);

        let last = Page {
            items: vec![5],
            total: 5,
            page: 3,
            limit: 2,
        };
        assert!(!last.has_more());
    }

    #[test]
    fn test_page_zero_limit() {
        let page: Page<i32> = Page {
            items: vec![],
            total: 0,
            page: 1,
            limit: 0,
        };
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_more());
    }
}
