//! Site link change op.

use tracing::debug;

use crate::changeop::ChangeOp;
use crate::config::Settings;
use crate::error::{ChangeOpError, InvalidArgument, ValidationError};
use crate::limits::MAX_PAGE_TITLE_LENGTH;
use crate::model::summary::update_summary;
use crate::model::{dedup_badges, Entity, ItemId, SiteLink, Summary, SummaryArg};
use crate::validate::ValidationResult;

/// Sets, updates or removes the link of one site.
///
/// | page title | badges | effect |
/// |---|---|---|
/// | `Some` | `Some` | replace page and badges |
/// | `Some` | `None` | replace page, keep existing badges |
/// | `None` | `Some` | replace badges of an existing link |
/// | `None` | `None` | remove the link |
#[derive(Debug, Clone)]
pub struct ChangeOpSiteLink {
    site_id: String,
    page_title: Option<String>,
    badges: Option<Vec<ItemId>>,
}

impl ChangeOpSiteLink {
    /// Checks the site against the registry and the badges against the
    /// whitelist. Duplicate badges collapse to their first occurrence.
    pub fn new(
        site_id: &str,
        page_title: Option<&str>,
        badges: Option<Vec<ItemId>>,
        settings: &Settings,
    ) -> Result<Self, InvalidArgument> {
        if !settings.is_known_site(site_id) {
            return Err(InvalidArgument::UnknownSite {
                site_id: site_id.to_string(),
            });
        }
        if let Some(badges) = &badges {
            if let Some(badge) = badges.iter().find(|b| !settings.is_allowed_badge(**b)) {
                return Err(InvalidArgument::BadgeNotAllowed { badge: *badge });
            }
        }

        Ok(Self {
            site_id: site_id.to_string(),
            page_title: page_title.map(str::to_string),
            badges: badges.map(dedup_badges),
        })
    }

    /// An op that removes the link of `site_id`.
    pub fn remove(site_id: &str, settings: &Settings) -> Result<Self, InvalidArgument> {
        Self::new(site_id, None, None, settings)
    }

    /// Re-sets an already stored link as is, without registry checks.
    pub(crate) fn from_existing(link: SiteLink) -> Self {
        Self {
            site_id: link.site_id,
            page_title: Some(link.page_title),
            badges: Some(link.badges),
        }
    }

    /// Removes the link of `site_id` without registry checks.
    pub(crate) fn removal(site_id: &str) -> Self {
        Self {
            site_id: site_id.to_string(),
            page_title: None,
            badges: None,
        }
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    pub fn badges(&self) -> Option<&[ItemId]> {
        self.badges.as_deref()
    }
}

impl ChangeOp for ChangeOpSiteLink {
    fn validate(&self, _entity: &Entity) -> ValidationResult {
        let Some(page) = &self.page_title else {
            return ValidationResult::ok();
        };
        let length = page.chars().count();
        if page.trim().is_empty() {
            ValidationResult::error(ValidationError::EmptyPageTitle)
        } else if length > MAX_PAGE_TITLE_LENGTH {
            ValidationResult::error(ValidationError::PageTitleTooLong {
                length,
                max: MAX_PAGE_TITLE_LENGTH,
            })
        } else {
            ValidationResult::ok()
        }
    }

    fn apply(
        &mut self,
        entity: &mut Entity,
        summary: Option<&mut Summary>,
    ) -> Result<(), ChangeOpError> {
        let entity_type = entity.entity_type();
        let links = entity
            .site_links_mut()
            .ok_or(ChangeOpError::UnsupportedEntityType {
                operation: "site link change",
                entity_type,
            })?;
        let site = self.site_id.as_str();

        let (action, args) = match (&self.page_title, &self.badges) {
            (Some(page), Some(badges)) => {
                let action = if links.has(site) { "set-both" } else { "add-both" };
                links.set(SiteLink::new(site, page.as_str()).with_badges(badges.iter().copied()));
                let mut args = vec![SummaryArg::from(page.as_str())];
                args.extend(badges.iter().map(|b| SummaryArg::EntityId((*b).into())));
                (action, args)
            }
            (Some(page), None) => {
                let (action, badges) = match links.get(site) {
                    Some(existing) => ("set", existing.badges.clone()),
                    None => ("add", Vec::new()),
                };
                links.set(SiteLink::new(site, page.as_str()).with_badges(badges));
                (action, vec![SummaryArg::from(page.as_str())])
            }
            (None, Some(badges)) => {
                let mut link = links.get(site).cloned().ok_or_else(|| {
                    InvalidArgument::SiteLinkNotFound {
                        site_id: site.to_string(),
                    }
                })?;
                link.badges = badges.clone();
                links.set(link);
                let args = badges.iter().map(|b| SummaryArg::EntityId((*b).into())).collect();
                ("set-badges", args)
            }
            (None, None) => {
                let removed = links.remove(site);
                let args = removed
                    .map(|l| vec![SummaryArg::from(l.page_title)])
                    .unwrap_or_default();
                ("remove", args)
            }
        };

        debug!(site, action, "applied site link change");
        update_summary(summary, action, Some(site), args);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::builder::{ItemBuilder, PropertyBuilder};
    use crate::model::DataType;

    const Q42: ItemId = ItemId::new(42);
    const Q149: ItemId = ItemId::new(149);

    fn settings() -> Settings {
        Settings::default().with_badges([Q42, Q149])
    }

    fn berlin() -> Entity {
        ItemBuilder::new()
            .id(ItemId::new(64))
            .site_link("plwiki", "Berlin", [Q42])
            .build()
    }

    fn link(entity: &Entity, site: &str) -> Option<SiteLink> {
        entity.site_links().and_then(|l| l.get(site)).cloned()
    }

    #[test]
    fn test_construction_checks() {
        assert!(matches!(
            ChangeOpSiteLink::new("nosuchwiki", Some("X"), None, &settings()),
            Err(InvalidArgument::UnknownSite { .. })
        ));
        assert_eq!(
            ChangeOpSiteLink::new("plwiki", None, Some(vec![ItemId::new(7)]), &settings()).unwrap_err(),
            InvalidArgument::BadgeNotAllowed {
                badge: ItemId::new(7)
            }
        );
    }

    #[test]
    fn test_badges_only_replaces_badges() {
        let mut entity = berlin();
        let mut summary = Summary::new();
        ChangeOpSiteLink::new("plwiki", None, Some(vec![Q149]), &settings())
            .unwrap()
            .apply(&mut entity, Some(&mut summary))
            .unwrap();
        assert_eq!(
            link(&entity, "plwiki"),
            Some(SiteLink::new("plwiki", "Berlin").with_badges([Q149]))
        );
        assert_eq!(summary.action_name.as_deref(), Some("set-badges"));
    }

    #[test]
    fn test_duplicate_badges_collapse() {
        let mut entity = berlin();
        let op = ChangeOpSiteLink::new("plwiki", None, Some(vec![Q42, Q149, Q42]), &settings()).unwrap();
        assert_eq!(op.badges(), Some([Q42, Q149].as_slice()));
        let mut op = op;
        op.apply(&mut entity, None).unwrap();
        assert_eq!(link(&entity, "plwiki").map(|l| l.badges), Some(vec![Q42, Q149]));
    }

    #[test]
    fn test_page_only_keeps_badges() {
        let mut entity = berlin();
        let mut summary = Summary::new();
        ChangeOpSiteLink::new("plwiki", Some("Berlin (miasto)"), None, &settings())
            .unwrap()
            .apply(&mut entity, Some(&mut summary))
            .unwrap();
        let updated = link(&entity, "plwiki").unwrap();
        assert_eq!(updated.page_title, "Berlin (miasto)");
        assert_eq!(updated.badges, vec![Q42]);
        assert_eq!(summary.action_name.as_deref(), Some("set"));
    }

    #[test]
    fn test_set_both_and_add_both() {
        let mut entity = berlin();
        let mut summary = Summary::new();
        ChangeOpSiteLink::new("dewiki", Some("Berlin"), Some(vec![Q149]), &settings())
            .unwrap()
            .apply(&mut entity, Some(&mut summary))
            .unwrap();
        assert_eq!(summary.action_name.as_deref(), Some("add-both"));

        ChangeOpSiteLink::new("plwiki", Some("Berlinie"), Some(vec![]), &settings())
            .unwrap()
            .apply(&mut entity, Some(&mut summary))
            .unwrap();
        assert_eq!(summary.action_name.as_deref(), Some("set-both"));
        assert_eq!(link(&entity, "plwiki"), Some(SiteLink::new("plwiki", "Berlinie")));
    }

    #[test]
    fn test_badges_without_link_fails() {
        let mut entity = ItemBuilder::new().id(ItemId::new(1)).build();
        let err = ChangeOpSiteLink::new("plwiki", None, Some(vec![Q42]), &settings())
            .unwrap()
            .apply(&mut entity, None)
            .unwrap_err();
        assert_eq!(
            err,
            ChangeOpError::InvalidArgument(InvalidArgument::SiteLinkNotFound {
                site_id: "plwiki".to_string()
            })
        );
    }

    #[test]
    fn test_remove() {
        let mut entity = berlin();
        ChangeOpSiteLink::remove("plwiki", &settings())
            .unwrap()
            .apply(&mut entity, None)
            .unwrap();
        assert!(link(&entity, "plwiki").is_none());
    }

    #[test]
    fn test_property_has_no_site_links() {
        let mut entity = PropertyBuilder::new(DataType::String).build();
        let err = ChangeOpSiteLink::new("plwiki", Some("X"), None, &settings())
            .unwrap()
            .apply(&mut entity, None)
            .unwrap_err();
        assert!(matches!(err, ChangeOpError::UnsupportedEntityType { .. }));
    }

    #[test]
    fn test_validate_page_title() {
        let entity = berlin();
        let op = ChangeOpSiteLink::new("plwiki", Some("  "), None, &settings()).unwrap();
        assert_eq!(op.validate(&entity).errors(), &[ValidationError::EmptyPageTitle]);
        let op = ChangeOpSiteLink::new("plwiki", Some("x".repeat(256).as_str()), None, &settings()).unwrap();
        assert!(!op.validate(&entity).is_valid());
        assert_eq!(op.site_id(), "plwiki");
    }
}
