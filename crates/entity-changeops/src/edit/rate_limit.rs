//! Save rate limiting keyed by user, action kind and group.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{RateLimitRule, Settings};
use crate::edit::User;

/// Right that disables rate limiting.
pub const BYPASS_RIGHT: &str = "noratelimit";

/// Kind of save being limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Edit,
    Create,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Edit => "edit",
            ActionKind::Create => "create",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether a user may perform another action now.
pub trait RateLimiter: fmt::Debug + Send + Sync {
    /// Returns true and counts the action if the user is within limits.
    fn is_within_limit(&self, user: &User, kind: ActionKind) -> bool;
}

/// Sliding-window limiter over configured per-group rules.
///
/// A user in several groups gets the least restrictive of their groups'
/// rules. Membership in a group with no rule for the action kind means no
/// limit.
#[derive(Debug)]
pub struct GroupRateLimiter {
    rules: Vec<RateLimitRule>,
    hits: Mutex<FxHashMap<(String, ActionKind), VecDeque<Instant>>>,
}

impl GroupRateLimiter {
    pub fn new(rules: Vec<RateLimitRule>) -> Self {
        Self {
            rules,
            hits: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.rate_limits.clone())
    }

    /// The rule that binds `user` for `kind`, or `None` if unlimited.
    pub fn effective_rule(&self, user: &User, kind: ActionKind) -> Option<&RateLimitRule> {
        let mut effective: Option<&RateLimitRule> = None;
        for group in &user.groups {
            let rule = self
                .rules
                .iter()
                .filter(|r| r.action == kind && &r.group == group)
                .max_by(|a, b| less_restrictive(a, b));
            match rule {
                None => return None,
                Some(rule) => {
                    effective = match effective {
                        Some(current) if less_restrictive(current, rule).is_ge() => Some(current),
                        _ => Some(rule),
                    };
                }
            }
        }
        effective
    }

    /// [`RateLimiter::is_within_limit`] at a given instant.
    pub fn is_within_limit_at(&self, user: &User, kind: ActionKind, now: Instant) -> bool {
        if user.has_right(BYPASS_RIGHT) {
            return true;
        }
        let Some(rule) = self.effective_rule(user, kind) else {
            return true;
        };
        if rule.window_secs == 0 {
            return true;
        }

        let window = Duration::from_secs(rule.window_secs);
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);
        let log = hits.entry((user.name.clone(), kind)).or_default();
        while log
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= window)
        {
            log.pop_front();
        }

        if log.len() < rule.count as usize {
            log.push_back(now);
            debug!(user = %user.name, %kind, used = log.len(), limit = rule.count, "rate limit hit recorded");
            true
        } else {
            warn!(user = %user.name, %kind, group = %rule.group, "rate limit exceeded");
            false
        }
    }
}

/// Orders rules by allowed rate, `count / window_secs`.
fn less_restrictive(a: &RateLimitRule, b: &RateLimitRule) -> std::cmp::Ordering {
    let a_rate = u128::from(a.count) * u128::from(b.window_secs);
    let b_rate = u128::from(b.count) * u128::from(a.window_secs);
    a_rate.cmp(&b_rate)
}

impl RateLimiter for GroupRateLimiter {
    fn is_within_limit(&self, user: &User, kind: ActionKind) -> bool {
        self.is_within_limit_at(user, kind, Instant::now())
    }
}

/// Limiter that allows everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRateLimit;

impl RateLimiter for NoRateLimit {
    fn is_within_limit(&self, _user: &User, _kind: ActionKind) -> bool {
        true
    }
}
