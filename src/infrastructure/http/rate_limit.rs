//! Client Rate Limiting
//!
//! 按客户端地址限流，每个路由组一个独立的限流器

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DashMapStateStore;
use governor::{Quota, RateLimiter};

type KeyedLimiter = RateLimiter<String, DashMapStateStore<String>, DefaultClock>;

/// 超出配额
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    /// 建议的重试等待秒数，至少 1
    pub retry_after_secs: u64,
}

/// 每分钟配额，突发上限等于配额
#[derive(Clone)]
pub struct ClientRateLimiter {
    limiter: Arc<KeyedLimiter>,
    per_minute: u32,
}

impl ClientRateLimiter {
    /// 配额为 0 时按 1 处理
    pub fn per_minute(per_minute: u32) -> Self {
        let burst = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
        Self::with_quota(Quota::per_minute(burst).allow_burst(burst), burst.get())
    }

    fn with_quota(quota: Quota, per_minute: u32) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::dashmap(quota)),
            per_minute,
        }
    }

    pub fn quota(&self) -> u32 {
        self.per_minute
    }

    pub fn check(&self, client: &str) -> Result<(), RateLimited> {
        match self.limiter.check_key(&client.to_string()) {
            Ok(()) => Ok(()),
            Err(not_until) => {
                let wait = not_until.wait_time_from(DefaultClock::default().now());
                Err(RateLimited {
                    retry_after_secs: wait.as_secs().max(1),
                })
            }
        }
    }

    /// 当前记录的客户端数量
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// 丢弃配额已完全恢复的客户端，返回丢弃的数量
    pub fn retain_recent(&self) -> usize {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        before.saturating_sub(self.limiter.len())
    }
}

impl std::fmt::Debug for ClientRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRateLimiter")
            .field("per_minute", &self.per_minute)
            .finish()
    }
}

/// 各路由组的限流器；未启用时为 None
#[derive(Debug, Clone)]
pub struct RateLimits {
    pub speech: ClientRateLimiter,
    pub models: ClientRateLimiter,
    pub default: ClientRateLimiter,
}

impl RateLimits {
    pub fn new(speech_per_minute: u32, models_per_minute: u32, default_per_minute: u32) -> Self {
        Self {
            speech: ClientRateLimiter::per_minute(speech_per_minute),
            models: ClientRateLimiter::per_minute(models_per_minute),
            default: ClientRateLimiter::per_minute(default_per_minute),
        }
    }

    pub fn retain_recent(&self) -> usize {
        self.speech.retain_recent() + self.models.retain_recent() + self.default.retain_recent()
    }

    /// 定期清理各限流器中的过期客户端
    pub fn spawn_sweeper(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let limits = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let dropped = limits.retain_recent();
                if dropped > 0 {
                    tracing::debug!(dropped, "Evicted idle rate-limit clients");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_exhausted_per_client() {
        let limiter = ClientRateLimiter::per_minute(2);

        assert!(limiter.check("10.0.0.1:1000").is_ok());
        assert!(limiter.check("10.0.0.1:1000").is_ok());

        let limited = limiter.check("10.0.0.1:1000").unwrap_err();
        assert!(limited.retry_after_secs >= 1);

        // 其他客户端不受影响
        assert!(limiter.check("10.0.0.2:1000").is_ok());
    }

    fn short_period_limiter() -> ClientRateLimiter {
        let quota = Quota::with_period(Duration::from_millis(10)).unwrap();
        ClientRateLimiter::with_quota(quota, 6000)
    }

    #[test]
    fn test_idle_clients_are_evicted() {
        let limiter = short_period_limiter();
        for i in 0..100 {
            assert!(limiter.check(&format!("10.0.{}.{}", i / 250, i % 250)).is_ok());
        }
        assert_eq!(limiter.tracked_clients(), 100);

        std::thread::sleep(Duration::from_millis(50));

        assert_eq!(limiter.retain_recent(), 100);
        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[test]
    fn test_recent_clients_are_kept() {
        let limiter = ClientRateLimiter::per_minute(30);
        assert!(limiter.check("10.0.0.1").is_ok());

        assert_eq!(limiter.retain_recent(), 0);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[tokio::test]
    async fn test_sweeper_evicts_idle_clients() {
        let limits = RateLimits {
            speech: short_period_limiter(),
            models: short_period_limiter(),
            default: short_period_limiter(),
        };
        assert!(limits.speech.check("10.0.0.1").is_ok());
        assert!(limits.default.check("10.0.0.2").is_ok());

        let sweeper = limits.spawn_sweeper(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;
        sweeper.abort();

        assert_eq!(limits.speech.tracked_clients(), 0);
        assert_eq!(limits.default.tracked_clients(), 0);
    }

    #[test]
    fn test_zero_quota_is_clamped() {
        let limiter = ClientRateLimiter::per_minute(0);
        assert_eq!(limiter.quota(), 1);
        assert!(limiter.check("unknown").is_ok());
        assert!(limiter.check("unknown").is_err());
    }
}
