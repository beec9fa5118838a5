//! Core HTTP operations with rate limiting and retry logic
//!
//! This module provides the fundamental request machinery shared by every
//! GitHub endpoint: a client-side rate limiter, retry with exponential
//! backoff on 429/503 and transport failures, and JSON decoding of the
//! response body.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::constants::limits;
use crate::errors::{ApiError, ApiResult};

/// HTTP operations handler with resilience patterns
pub struct HttpHandler {
    client: Client,
    rate_limiter: RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client and rate limiting
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if `rate_limit_rps` is zero
    pub fn new(client: Client, rate_limit_rps: u32) -> ApiResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
        })
    }

    fn build_rate_limiter(
        rate_limit_rps: u32,
    ) -> ApiResult<RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>> {
        let quota =
            Quota::per_second(NonZeroU32::new(rate_limit_rps).ok_or(ApiError::InvalidRateLimit)?);
        Ok(RateLimiter::direct(quota))
    }

    /// Executes a request with rate limiting and retry, decoding the JSON body
    ///
    /// The builder closure is invoked once per attempt because a
    /// `RequestBuilder` is consumed on send.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on a non-success status or when retries are
    /// exhausted
    pub async fn request_json<T, F>(&self, build: F) -> ApiResult<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let response = self.execute(build).await?;
        Ok(response.json::<T>().await?)
    }

    /// Executes a request with rate limiting and retry logic
    async fn execute<F>(&self, build: F) -> ApiResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        // Apply rate limiting with jitter to avoid thundering herd
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;

        let mut retries = 0;
        loop {
            match build().send().await {
                Ok(response) => {
                    let status = response.status().as_u16();

                    // Server-side throttling and overload are retryable.
                    if status == 429 || status == 503 {
                        if retries < limits::MAX_RETRIES {
                            retries += 1;
                            let delay = backoff_delay(retries);
                            tracing::warn!(
                                status,
                                "throttled by server, backing off for {}ms",
                                delay.as_millis()
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        } else if status == 429 {
                            return Err(ApiError::RateLimitExceeded);
                        } else {
                            return Err(ApiError::Status { status });
                        }
                    }

                    if !response.status().is_success() {
                        return Err(ApiError::Status { status });
                    }

                    tracing::debug!(status, "request succeeded");
                    return Ok(response);
                }
                Err(e) if retries < limits::MAX_RETRIES => {
                    retries += 1;
                    let delay = backoff_delay(retries);
                    tracing::warn!(
                        "request failed (attempt {}/{}): {}. Retrying in {}ms",
                        retries,
                        limits::MAX_RETRIES,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!("request failed after {} retries: {}", limits::MAX_RETRIES, e);
                    return Err(ApiError::MaxRetriesExceeded {
                        max_retries: limits::MAX_RETRIES,
                    });
                }
            }
        }
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl std::fmt::Debug for HttpHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpHandler").finish_non_exhaustive()
    }
}

fn backoff_delay(retries: u32) -> Duration {
    Duration::from_millis(limits::RETRY_BASE_DELAY_MS * 2_u64.pow(retries))
}
