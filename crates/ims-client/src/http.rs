use crate::api::InteractionApi;
use crate::error::{ApiError, Result};
use crate::wire::{self, Envelope, SingleInteraction, SiteList};
use ims_core::{
    Interaction, InteractionId, InteractionPage, InteractionPayload, ListParams, Site, SiteId,
};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderValue, ACCEPT};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

const USER_AGENT: &str = concat!("ims/", env!("CARGO_PKG_VERSION"));
const REQUEST_ID_HEADER: &str = "X-Request-ID";

#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let mut raw = base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw)?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(ApiError::Decode(format!(
                "api base url must use http or https: {}",
                base
            )));
        }
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base.join(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Sends the request and returns the body of a successful response.
    fn execute(&self, request: RequestBuilder) -> Result<String> {
        let request_id = Uuid::new_v4().to_string();
        let mut request = request
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(REQUEST_ID_HEADER, request_id.as_str());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let request = request.build()?;
        debug!(
            method = %request.method(),
            url = %request.url(),
            request_id = %request_id,
            "api request"
        );
        let response = self.client.execute(request)?;
        let status = response.status();
        let body = response.text()?;

        if status.is_success() {
            debug!(status = status.as_u16(), request_id = %request_id, "api response");
            return Ok(body);
        }
        let err = wire::decode_error(status.as_u16(), &body);
        warn!(status = status.as_u16(), request_id = %request_id, error = %err, "api request failed");
        Err(err)
    }

    fn site_query(site_id: SiteId) -> [(&'static str, String); 1] {
        [("site_id", site_id.to_string())]
    }
}

impl InteractionApi for HttpApi {
    fn backend_name(&self) -> &'static str {
        "http"
    }

    fn list_sites(&self) -> Result<Vec<Site>> {
        let url = self.endpoint("sites/", &[])?;
        let body = self.execute(self.client.get(url))?;
        let envelope: Envelope<SiteList> = wire::decode(&body)?;
        Ok(envelope.data.sites)
    }

    fn list_interactions(&self, params: &ListParams) -> Result<InteractionPage> {
        let query: Vec<(&str, String)> = params
            .pairs()
            .iter()
            .map(|(key, value)| (*key, value.clone()))
            .collect();
        let url = self.endpoint("interactions/", &query)?;
        let body = self.execute(self.client.get(url))?;
        let requested = params
            .get("page_size")
            .and_then(|size| size.parse().ok())
            .unwrap_or(ims_core::PageSize::DEFAULT.get());
        wire::decode_page(&body, requested)
    }

    fn get_interaction(&self, site_id: SiteId, id: InteractionId) -> Result<Interaction> {
        let url = self.endpoint(&format!("interactions/{}", id), &Self::site_query(site_id))?;
        let body = self.execute(self.client.get(url))?;
        let envelope: Envelope<SingleInteraction> = wire::decode(&body)?;
        Ok(envelope.data.interaction)
    }

    fn create_interaction(
        &self,
        site_id: SiteId,
        payload: &InteractionPayload,
    ) -> Result<Interaction> {
        let url = self.endpoint("interactions/", &Self::site_query(site_id))?;
        let body = self.execute(self.client.post(url).json(payload))?;
        let envelope: Envelope<SingleInteraction> = wire::decode(&body)?;
        info!(id = %envelope.data.interaction.id, "created interaction");
        Ok(envelope.data.interaction)
    }

    fn update_interaction(
        &self,
        site_id: SiteId,
        id: InteractionId,
        payload: &InteractionPayload,
    ) -> Result<Interaction> {
        let url = self.endpoint(&format!("interactions/{}", id), &Self::site_query(site_id))?;
        let body = self.execute(self.client.put(url).json(payload))?;
        let envelope: Envelope<SingleInteraction> = wire::decode(&body)?;
        info!(id = %id, "updated interaction");
        Ok(envelope.data.interaction)
    }

    fn delete_interaction(&self, site_id: SiteId, id: InteractionId) -> Result<()> {
        let url = self.endpoint(&format!("interactions/{}", id), &Self::site_query(site_id))?;
        self.execute(self.client.delete(url))?;
        info!(id = %id, "deleted interaction");
        Ok(())
    }
}
