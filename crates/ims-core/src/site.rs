use crate::domain::{Site, SiteId};
use crate::error::{CoreError, Result};

/// The sites a session may access and the one currently selected.
///
/// Created at session start with [`SiteContext::start`], cleared at logout.
/// Finder and form state take the active id from here rather than from
/// anything global.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteContext {
    sites: Vec<Site>,
    active: Option<SiteId>,
}

impl SiteContext {
    /// Selects `preferred` when it is accessible, otherwise the first site.
    pub fn start(sites: Vec<Site>, preferred: Option<SiteId>) -> Self {
        let active = preferred
            .filter(|id| sites.iter().any(|site| site.id == *id))
            .or_else(|| sites.first().map(|site| site.id));
        Self { sites, active }
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn active_id(&self) -> Option<SiteId> {
        self.active
    }

    pub fn active_site(&self) -> Option<&Site> {
        let active = self.active?;
        self.sites.iter().find(|site| site.id == active)
    }

    pub fn require_active(&self) -> Result<SiteId> {
        self.active.ok_or(CoreError::NoActiveSite)
    }

    /// Returns whether the active site changed.
    pub fn switch_to(&mut self, site_id: SiteId) -> Result<bool> {
        if !self.sites.iter().any(|site| site.id == site_id) {
            return Err(CoreError::UnknownSite(site_id));
        }
        if self.active == Some(site_id) {
            return Ok(false);
        }
        self.active = Some(site_id);
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.sites.clear();
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::SiteContext;
    use crate::domain::{Site, SiteId};
    use crate::error::CoreError;

    fn sites() -> Vec<Site> {
        vec![
            Site {
                id: SiteId::new(1),
                name: "Headquarters".to_string(),
                description: None,
            },
            Site {
                id: SiteId::new(2),
                name: "Field Office".to_string(),
                description: None,
            },
        ]
    }

    #[test]
    fn start_prefers_accessible_site() {
        let ctx = SiteContext::start(sites(), Some(SiteId::new(2)));
        assert_eq!(ctx.active_id(), Some(SiteId::new(2)));
        assert_eq!(ctx.active_site().map(|s| s.name.as_str()), Some("Field Office"));
    }

    #[test]
    fn start_falls_back_to_first_site() {
        let ctx = SiteContext::start(sites(), Some(SiteId::new(99)));
        assert_eq!(ctx.active_id(), Some(SiteId::new(1)));
        assert_eq!(SiteContext::start(vec![], None).active_id(), None);
    }

    #[test]
    fn switch_reports_change_and_rejects_unknown() {
        let mut ctx = SiteContext::start(sites(), None);
        assert_eq!(ctx.switch_to(SiteId::new(1)), Ok(false));
        assert_eq!(ctx.switch_to(SiteId::new(2)), Ok(true));
        assert_eq!(
            ctx.switch_to(SiteId::new(7)),
            Err(CoreError::UnknownSite(SiteId::new(7)))
        );
        assert_eq!(ctx.active_id(), Some(SiteId::new(2)));
    }

    #[test]
    fn clear_drops_active_site() {
        let mut ctx = SiteContext::start(sites(), None);
        ctx.clear();
        assert!(ctx.sites().is_empty());
        assert_eq!(ctx.require_active(), Err(CoreError::NoActiveSite));
    }
}
