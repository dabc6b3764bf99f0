use super::types::{
    RequestOptions, RouteRequest, RouteResponse, TraceAttributesRequest, TraceAttributesResponse,
};
use crate::sdk::routing::coord::Coord;
use crate::sdk::routing::error::{TransportError, ValhallaErrorPayload};
use crate::sdk::routing::service::RoutingProvider;
use crate::sdk::util::rate_limit::{self, Limiter};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub struct ValhallaProvider {
    client: Client,
    base_url: String,
    options: RequestOptions,
    limiter: Option<Limiter>,
}

impl ValhallaProvider {
    pub fn new(
        base_url: String,
        options: RequestOptions,
        timeout: Duration,
        limiter: Option<Limiter>,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            options,
            limiter,
        })
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<R, TransportError> {
        if let Some(limiter) = &self.limiter {
            rate_limit::wait(limiter);
        }
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = match self.client.post(&url).json(body).send() {
            Ok(resp) => resp,
            Err(e) => {
                log::error!("Failed to send POST request. URL: {}\nError: {}", url, e);
                return Err(TransportError::Request(e));
            }
        };

        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            return Err(map_error(status, text));
        }

        serde_json::from_str(&text).map_err(|e| {
            log::error!(
                "Failed to parse {} response. URL: {}\nError: {}. Body: {}",
                endpoint,
                url,
                e,
                text
            );
            TransportError::Parse(e)
        })
    }
}

/// Turns a non-success response into a structured or raw API error.
pub fn map_error(status: StatusCode, text: String) -> TransportError {
    // Try to parse the structured error first
    if let Ok(payload) = serde_json::from_str::<ValhallaErrorPayload>(&text) {
        return TransportError::Api {
            status: payload.status_code.unwrap_or(status.as_u16()),
            code: payload.error_code,
            message: payload.error,
        };
    }
    log::error!(
        "API returned non-success status: {}. Unparseable Body: {}",
        status,
        text
    );
    TransportError::RawApi {
        status: status.as_u16(),
        body: text,
    }
}

impl RoutingProvider for ValhallaProvider {
    fn route(&self, waypoints: &[Coord]) -> Result<RouteResponse, TransportError> {
        log::debug!(
            "[PROVIDER] Calling route for {} waypoints starting at {}",
            waypoints.len(),
            waypoints.first().map(ToString::to_string).unwrap_or_default()
        );
        let body = RouteRequest::new(waypoints, &self.options);
        self.post("route", &body)
    }

    fn trace_attributes(&self, shape: &[Coord]) -> Result<TraceAttributesResponse, TransportError> {
        log::debug!("[PROVIDER] Calling trace_attributes for {} points", shape.len());
        let body = TraceAttributesRequest::new(shape, &self.options);
        self.post("trace_attributes", &body)
    }
}
