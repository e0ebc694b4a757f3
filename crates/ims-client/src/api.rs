use crate::Result;
use ims_core::{
    Interaction, InteractionId, InteractionPage, InteractionPayload, ListParams, Site, SiteId,
};

/// The interaction API as the client sees it. Every call is scoped to a site:
/// list calls carry `site_id` in their params, the rest take it explicitly.
pub trait InteractionApi: Send {
    fn backend_name(&self) -> &'static str;
    fn list_sites(&self) -> Result<Vec<Site>>;
    fn list_interactions(&self, params: &ListParams) -> Result<InteractionPage>;
    fn get_interaction(&self, site_id: SiteId, id: InteractionId) -> Result<Interaction>;
    fn create_interaction(
        &self,
        site_id: SiteId,
        payload: &InteractionPayload,
    ) -> Result<Interaction>;
    fn update_interaction(
        &self,
        site_id: SiteId,
        id: InteractionId,
        payload: &InteractionPayload,
    ) -> Result<Interaction>;
    fn delete_interaction(&self, site_id: SiteId, id: InteractionId) -> Result<()>;
}

impl<T: InteractionApi + ?Sized> InteractionApi for Box<T> {
    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    fn list_sites(&self) -> Result<Vec<Site>> {
        (**self).list_sites()
    }

    fn list_interactions(&self, params: &ListParams) -> Result<InteractionPage> {
        (**self).list_interactions(params)
    }

    fn get_interaction(&self, site_id: SiteId, id: InteractionId) -> Result<Interaction> {
        (**self).get_interaction(site_id, id)
    }

    fn create_interaction(
        &self,
        site_id: SiteId,
        payload: &InteractionPayload,
    ) -> Result<Interaction> {
        (**self).create_interaction(site_id, payload)
    }

    fn update_interaction(
        &self,
        site_id: SiteId,
        id: InteractionId,
        payload: &InteractionPayload,
    ) -> Result<Interaction> {
        (**self).update_interaction(site_id, id, payload)
    }

    fn delete_interaction(&self, site_id: SiteId, id: InteractionId) -> Result<()> {
        (**self).delete_interaction(site_id, id)
    }
}
