//! Site links: an item's pages on external sites.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::ItemId;

/// A page on one site, with optional badges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteLink {
    pub site_id: String,
    pub page_title: String,
    /// Badge items, duplicates removed, first occurrence wins.
    #[serde(default)]
    pub badges: Vec<ItemId>,
}

impl SiteLink {
    pub fn new(site_id: impl Into<String>, page_title: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            page_title: page_title.into(),
            badges: Vec::new(),
        }
    }

    pub fn with_badges(mut self, badges: impl IntoIterator<Item = ItemId>) -> Self {
        self.badges = dedup_badges(badges);
        self
    }
}

/// Removes duplicate badges, keeping the first occurrence of each.
pub fn dedup_badges(badges: impl IntoIterator<Item = ItemId>) -> Vec<ItemId> {
    let mut out = Vec::new();
    for badge in badges {
        if !out.contains(&badge) {
            out.push(badge);
        }
    }
    out
}

/// Site links keyed by site id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteLinkList {
    links: BTreeMap<String, SiteLink>,
}

impl SiteLinkList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, site_id: &str) -> Option<&SiteLink> {
        self.links.get(site_id)
    }

    pub fn has(&self, site_id: &str) -> bool {
        self.links.contains_key(site_id)
    }

    /// Inserts or replaces the link for its site, returning the previous one.
    pub fn set(&mut self, link: SiteLink) -> Option<SiteLink> {
        self.links.insert(link.site_id.clone(), link)
    }

    pub fn remove(&mut self, site_id: &str) -> Option<SiteLink> {
        self.links.remove(site_id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SiteLink> {
        self.links.values()
    }

    pub fn site_ids(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(String::as_str)
    }
}

impl FromIterator<SiteLink> for SiteLinkList {
    fn from_iter<I: IntoIterator<Item = SiteLink>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().map(|l| (l.site_id.clone(), l)).collect(),
        }
    }
}
