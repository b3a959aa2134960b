//! Fixed-window request counting per client and endpoint class.
//!
//! One [`RateLimiter`] is built at startup and shared through `AppState`.
//! Counters for different classes live in the same map under distinct key
//! namespaces, so a client's login attempts never eat into its read budget.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{LimitPolicy, RateLimitConfig};

pub const DEFAULT_LIMIT_MESSAGE: &str = "Too many requests. Please try again later.";

/// Endpoint classes with independent budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitClass {
    Login,
    Contact,
    Upload,
    Api,
    PublicRead,
}

impl LimitClass {
    pub const ALL: [LimitClass; 5] = [
        LimitClass::Login,
        LimitClass::Contact,
        LimitClass::Upload,
        LimitClass::Api,
        LimitClass::PublicRead,
    ];

    /// Key namespace and config section name.
    pub fn name(self) -> &'static str {
        match self {
            LimitClass::Login => "login",
            LimitClass::Contact => "contact",
            LimitClass::Upload => "upload",
            LimitClass::Api => "api",
            LimitClass::PublicRead => "public_read",
        }
    }

    /// Whether responses carry the `X-RateLimit-*` headers.
    pub fn exposes_headers(self) -> bool {
        matches!(self, LimitClass::Login | LimitClass::Contact)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowEntry {
    count: u32,
    /// Unix seconds at which the window closes.
    reset_at: u64,
}

/// Outcome of a single [`RateLimiter::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: u64,
    pub error: Option<String>,
}

pub struct RateLimiter {
    entries: DashMap<String, WindowEntry>,
    policies: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(policies: RateLimitConfig) -> Self {
        Self {
            entries: DashMap::new(),
            policies,
        }
    }

    /// Counts one request from `client_key` against the budget of `class`.
    pub fn check(&self, class: LimitClass, client_key: &str, now: u64) -> RateDecision {
        let key = format!("{}:{client_key}", class.name());
        self.check_key(key, self.policies.policy(class), now)
    }

    /// The fixed-window step for an already namespaced key.
    ///
    /// The entry stays locked between read and increment, so concurrent
    /// requests for one key never admit more than `max_requests` per window.
    pub fn check_key(&self, key: String, policy: &LimitPolicy, now: u64) -> RateDecision {
        let fresh = WindowEntry {
            count: 1,
            reset_at: now.saturating_add(policy.window_secs),
        };

        let current = match self.entries.entry(key) {
            Entry::Vacant(slot) => *slot.insert(fresh),
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                if entry.reset_at <= now {
                    *entry = fresh;
                } else {
                    entry.count = entry.count.saturating_add(1);
                }
                *entry
            }
        };

        if current.count > policy.max_requests {
            return RateDecision {
                allowed: false,
                limit: policy.max_requests,
                remaining: 0,
                reset_at: current.reset_at,
                error: Some(
                    policy
                        .message
                        .clone()
                        .unwrap_or_else(|| DEFAULT_LIMIT_MESSAGE.to_string()),
                ),
            };
        }

        RateDecision {
            allowed: true,
            limit: policy.max_requests,
            remaining: policy.max_requests - current.count,
            reset_at: current.reset_at,
            error: None,
        }
    }

    /// Drops every window that has closed by `now`. Returns how many were removed.
    pub fn sweep(&self, now: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.reset_at > now);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs [`sweep`](Self::sweep) every `every` until `shutdown` is cancelled.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        every: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::debug!("Rate limit sweeper stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        let removed = self.sweep(jsonwebtoken::get_current_timestamp());
                        if removed > 0 {
                            tracing::debug!(
                                "Swept {removed} expired rate limit windows ({} remain)",
                                self.len()
                            );
                        }
                    }
                }
            }
        })
    }
}

/// Attributes a request to a client: first `X-Forwarded-For` hop, then
/// `X-Real-IP`, then `User-Agent`, else `"unknown"`.
///
/// Trusts the proxy headers as given; only meaningful behind a reverse proxy.
pub fn client_key(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(first) = header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }

    header("x-real-ip")
        .or_else(|| header("user-agent"))
        .unwrap_or("unknown")
        .to_string()
}
