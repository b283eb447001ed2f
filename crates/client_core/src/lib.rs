use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{CurrentSlide, Element, ElementId},
    error::ApiError,
    protocol::{
        Ack, ElementListing, HealthReport, ResponseListing, ResultsPayload, SaveElementRequest,
        SetSlideRequest, SlideAck, SubmitAck, SubmitResponseRequest,
    },
};
use tracing::{debug, warn};
use url::{ParseError, Url};

pub mod error;

pub use error::ClientError;

const ADMIN_KEY_HEADER: &str = "x-admin-key";
const MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// HTTP client for the presentation sync server, used by the control
/// source, the presenter and admin panels, and audience tooling.
#[derive(Clone)]
pub struct SlideSyncClient {
    http: Client,
    base_url: Url,
    admin_key: Option<String>,
}

impl SlideSyncClient {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(server_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Url(ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        Ok(Self {
            http: Client::new(),
            base_url,
            admin_key: None,
        })
    }

    pub fn with_admin_key(mut self, admin_key: impl Into<String>) -> Self {
        self.admin_key = Some(admin_key.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthReport, ClientError> {
        self.send(self.request(Method::GET, &["health"])?).await
    }

    pub async fn current_slide(&self) -> Result<CurrentSlide, ClientError> {
        self.send(self.request(Method::GET, &["api", "current-slide"])?).await
    }

    pub async fn set_slide(&self, slide_name: &str) -> Result<SlideAck, ClientError> {
        let body = SetSlideRequest {
            slide_name: Some(slide_name.to_string()),
        };
        self.send(self.request(Method::POST, &["api", "current-slide"])?.json(&body))
            .await
    }

    pub async fn list_elements(&self) -> Result<ElementListing, ClientError> {
        self.send(self.request(Method::GET, &["api", "elements"])?).await
    }

    pub async fn element(&self, id: &ElementId) -> Result<Element, ClientError> {
        self.send(self.request(Method::GET, &["api", "elements", id.as_str()])?)
            .await
    }

    pub async fn save_element(&self, req: &SaveElementRequest) -> Result<Element, ClientError> {
        self.send(self.request(Method::POST, &["api", "elements"])?.json(req))
            .await
    }

    pub async fn delete_element(&self, id: &ElementId) -> Result<Ack, ClientError> {
        self.send(self.request(Method::DELETE, &["api", "elements", id.as_str()])?)
            .await
    }

    pub async fn submit_response(
        &self,
        req: &SubmitResponseRequest,
    ) -> Result<SubmitAck, ClientError> {
        self.send(self.request(Method::POST, &["api", "responses"])?.json(req))
            .await
    }

    pub async fn responses(&self, element_id: &ElementId) -> Result<ResponseListing, ClientError> {
        self.send(self.request(Method::GET, &["api", "responses", element_id.as_str()])?)
            .await
    }

    pub async fn results(&self, element_id: &ElementId) -> Result<ResultsPayload, ClientError> {
        self.send(self.request(Method::GET, &["api", "results", element_id.as_str()])?)
            .await
    }

    pub async fn clear_responses(&self) -> Result<Ack, ClientError> {
        self.send(self.request(Method::POST, &["api", "admin", "clear-responses"])?)
            .await
    }

    /// Poll-model watcher that reports each slide transition once.
    pub fn watch_slides(&self, interval: Duration) -> SlideWatcher {
        SlideWatcher {
            client: self.clone(),
            interval,
            last_seen: None,
        }
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Url(ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        let mut builder = self.http.request(method, url);
        if let Some(key) = &self.admin_key {
            builder = builder.header(ADMIN_KEY_HEADER, key);
        }
        Ok(builder)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        match response.json::<ApiError>().await {
            Ok(err) => Err(ClientError::Api(err)),
            Err(_) => Err(ClientError::Status(status)),
        }
    }
}

/// Yields the current slide whenever its timestamp moves. A transient
/// request failure is logged and retried on the next tick.
pub struct SlideWatcher {
    client: SlideSyncClient,
    interval: Duration,
    last_seen: Option<CurrentSlide>,
}

impl SlideWatcher {
    pub async fn next_change(&mut self) -> Result<CurrentSlide, ClientError> {
        let mut failures = 0u32;
        loop {
            match self.client.current_slide().await {
                Ok(slide) => {
                    failures = 0;
                    if self.last_seen.as_ref() != Some(&slide) {
                        debug!(slide = %slide.current_slide, "slide change observed");
                        self.last_seen = Some(slide.clone());
                        return Ok(slide);
                    }
                }
                Err(err @ ClientError::Url(_)) => return Err(err),
                Err(err) => {
                    failures += 1;
                    if failures >= MAX_CONSECUTIVE_FAILURES {
                        return Err(err);
                    }
                    warn!(%err, failures, "slide poll failed");
                }
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    pub fn last_seen(&self) -> Option<&CurrentSlide> {
        self.last_seen.as_ref()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
