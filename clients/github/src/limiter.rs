use chrono::{DateTime, TimeZone, Utc};
use derive_more::Constructor;
use log::{debug, info};
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::Mutex;

const SAFETY_MARGIN_SECS: i64 = 1;

/// Last rate limit state reported by the API.
#[derive(Constructor, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub remaining: Option<u32>,
    /// Epoch seconds at which `remaining` is replenished.
    pub reset: Option<i64>,
}

impl RateLimit {
    /// Time to wait at `now` before the next request may be sent.
    pub fn time_to_wait(&self, now: DateTime<Utc>) -> Option<Duration> {
        match (self.remaining, self.reset) {
            (Some(0), Some(reset)) => {
                let until = Utc.timestamp_opt(reset.checked_add(SAFETY_MARGIN_SECS)?, 0).single()?;
                (until - now).to_std().ok().filter(|delay| !delay.is_zero())
            }
            _ => None,
        }
    }
}

/// Guards every request against the API's rate limit.
#[derive(Constructor, Default)]
pub struct RateLimiter {
    limit: Mutex<RateLimit>,
}

impl RateLimiter {
    /// Sleeps until the limit resets when no requests are left.
    pub(crate) async fn wait(&self) {
        let limit = *self.limit.lock().await;
        match limit.time_to_wait(Utc::now()) {
            Some(delay) => {
                info!("Rate limit reached. Waiting {} sec", delay.as_secs());
                tokio::time::sleep(delay).await;
            }
            None => debug!("Remaining limit {:?}. Not waiting.", limit.remaining),
        }
    }

    /// Stores whatever limit headers the response carries. Missing headers keep the previous values.
    pub(crate) async fn update(&self, headers: &HeaderMap<HeaderValue>) {
        let mut limit = self.limit.lock().await;
        if let Some(remaining) = read_header::<u32>(headers, "x-ratelimit-remaining") {
            limit.remaining = Some(remaining);
        }
        if let Some(reset) = read_header::<i64>(headers, "x-ratelimit-reset") {
            limit.reset = Some(reset);
        }
        debug!("Updated limits: {:?}", limit);
    }

    pub(crate) async fn seed(&self, seeded: RateLimit) {
        *self.limit.lock().await = seeded;
    }

    pub async fn current(&self) -> RateLimit {
        *self.limit.lock().await
    }
}

fn read_header<T>(headers: &HeaderMap<HeaderValue>, header: &str) -> Option<T>
where
    T: FromStr,
{
    let value = headers.get(header)?.to_str().ok()?;
    match value.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            debug!("Ignoring malformed {} header: {}", header, value);
            None
        }
    }
}
