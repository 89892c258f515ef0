//! Distraction list: a record of sites the user intends to avoid.
//!
//! Nothing here intercepts traffic. The list is kept in memory for the
//! lifetime of the process and starts from the seeded defaults.

use crate::error::AppError;
use crate::models::BlockedSite;
use crate::validation::{normalize_site_url, validate_link_name};
use log::info;

pub const DEFAULT_BLOCKED_SITES: &[(&str, &str)] = &[
    ("Facebook", "facebook.com"),
    ("Twitter", "twitter.com"),
    ("Instagram", "instagram.com"),
    ("YouTube", "youtube.com"),
    ("Reddit", "reddit.com"),
    ("TikTok", "tiktok.com"),
];

#[derive(Debug, Clone)]
pub struct DistractionList {
    sites: Vec<BlockedSite>,
}

impl Default for DistractionList {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl DistractionList {
    pub fn empty() -> Self {
        Self { sites: Vec::new() }
    }

    pub fn with_defaults() -> Self {
        let sites = DEFAULT_BLOCKED_SITES
            .iter()
            .zip(1u64..)
            .map(|((name, url), id)| BlockedSite::new(id, name, url))
            .collect();
        Self { sites }
    }

    pub fn sites(&self) -> &[BlockedSite] {
        &self.sites
    }

    /// Append a site, blocked, under the next free id.
    pub fn add(&mut self, name: &str, url: &str) -> Result<BlockedSite, AppError> {
        let name = validate_link_name(name)?;
        let host = normalize_site_url(url)?;

        let id = self.sites.iter().map(|s| s.id).max().map_or(1, |max| max + 1);
        let site = BlockedSite::new(id, name, &host);
        info!("Added {host} to distraction list");
        self.sites.push(site.clone());
        Ok(site)
    }

    /// Flip the blocked flag. Returns the updated site, if present.
    pub fn toggle(&mut self, id: u64) -> Option<BlockedSite> {
        let site = self.sites.iter_mut().find(|s| s.id == id)?;
        site.is_blocked = !site.is_blocked;
        Some(site.clone())
    }

    /// Returns true if a site was removed.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.sites.len();
        self.sites.retain(|s| s.id != id);
        self.sites.len() != before
    }

    /// Whether the host of `url` is on the list and currently blocked.
    pub fn is_blocked(&self, url: &str) -> bool {
        let Ok(host) = normalize_site_url(url) else {
            return false;
        };
        self.sites
            .iter()
            .any(|s| s.is_blocked && s.matches_host(&host))
    }
}
