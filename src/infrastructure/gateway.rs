//! Gateway adapters for the metering backend.
//!
//! `HttpGateway` speaks the backend's JSON-over-HTTP protocol:
//!
//! | Call | Request | Response |
//! |---|---|---|
//! | quota check | `POST {base}/meter/check` `{site, path}` | `{allowed: bool}` |
//! | hit report | `POST {base}/meter/hit` `{site, path}` | ignored |
//! | registration | `POST {base}/register` `{site, email, path}` | ignored |
//!
//! `DisabledGateway` is used when no backend is configured: every quota
//! check is allowed and nothing leaves the process.

use crate::application::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use crate::application::ports::{Clock, Gateway, GatewayError};
use crate::domain::outcome::QuotaVerdict;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct PageBody<'a> {
    site: &'a str,
    path: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterBody<'a> {
    site: &'a str,
    email: &'a str,
    path: &'a str,
}

/// HTTP adapter for the metering backend.
///
/// Every call is bounded by the request timeout and guarded by a circuit
/// breaker; while the circuit is open calls fail with
/// `GatewayError::CircuitOpen` without touching the network.
#[derive(Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    api_base: String,
    site_id: String,
    breaker: CircuitBreaker,
}

impl HttpGateway {
    /// Create a gateway for `api_base` reporting as `site_id`.
    ///
    /// # Errors
    /// Returns `GatewayError::Transport` if the HTTP client cannot be built.
    pub fn new(
        api_base: &str,
        site_id: &str,
        request_timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GatewayError> {
        Self::with_breaker_config(
            api_base,
            site_id,
            request_timeout,
            CircuitBreakerConfig::default(),
            clock,
        )
    }

    /// Create a gateway with a custom circuit breaker configuration.
    ///
    /// # Errors
    /// Returns `GatewayError::Transport` if the HTTP client cannot be built.
    pub fn with_breaker_config(
        api_base: &str,
        site_id: &str,
        request_timeout: Duration,
        breaker: CircuitBreakerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            site_id: site_id.to_string(),
            breaker: CircuitBreaker::new(breaker, clock),
        })
    }

    /// Current state of the circuit breaker.
    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_base, endpoint)
    }

    /// POST a JSON body and return the raw response body of a 2xx answer.
    async fn post<B: Serialize + Sync>(&self, endpoint: &str, body: &B) -> Result<Vec<u8>, GatewayError> {
        // Held across the await: a caller dropping this future mid-request
        // (the decider's quota bound) settles the permit as a failure.
        let Some(permit) = self.breaker.acquire() else {
            return Err(GatewayError::CircuitOpen);
        };

        let result = self.send(endpoint, body).await;
        match &result {
            Ok(_) => permit.succeed(),
            Err(e) => {
                permit.fail();
                if self.breaker.state() == CircuitState::Open {
                    tracing::warn!(error = %e, endpoint, "backend failing, circuit open");
                }
            }
        }
        result
    }

    async fn send<B: Serialize + Sync>(&self, endpoint: &str, body: &B) -> Result<Vec<u8>, GatewayError> {
        let response = self
            .client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(map_transport)?;
        Ok(bytes.to_vec())
    }
}

fn map_transport(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(e.to_string())
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn check_quota(&self, path: &str) -> Result<QuotaVerdict, GatewayError> {
        let body = PageBody {
            site: &self.site_id,
            path,
        };
        let bytes = self.post("/meter/check", &body).await?;
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn record_hit(&self, path: &str) -> Result<(), GatewayError> {
        let body = PageBody {
            site: &self.site_id,
            path,
        };
        self.post("/meter/hit", &body).await.map(|_| ())
    }

    async fn register_email(&self, email: &str, path: &str) -> Result<(), GatewayError> {
        let body = RegisterBody {
            site: &self.site_id,
            email,
            path,
        };
        self.post("/register", &body).await.map(|_| ())
    }
}

/// Gateway used when no backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGateway;

#[async_trait]
impl Gateway for DisabledGateway {
    async fn check_quota(&self, _path: &str) -> Result<QuotaVerdict, GatewayError> {
        Ok(QuotaVerdict::allow())
    }

    async fn record_hit(&self, _path: &str) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn register_email(&self, _email: &str, _path: &str) -> Result<(), GatewayError> {
        Ok(())
    }
}
