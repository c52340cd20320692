use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::types::LlmError;

/// 指数退避：第n次被限流后等待 base^n 秒
pub fn exponential_delay(base_secs: u64) -> impl Fn(u32) -> Duration {
    move |attempt| Duration::from_secs(base_secs.saturating_pow(attempt))
}

/// 通用重试逻辑：只对限流重试，其他错误立即返回
///
/// `delay` 接收已失败的尝试次数（从1开始），返回下一次尝试前的等待时长。
pub async fn retry_with_backoff<T, F, Fut, D>(
    max_attempts: u32,
    delay: D,
    mut operation: F,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
    D: Fn(u32) -> Duration,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(result) => return Ok(result),
            Err(LlmError::RateLimited(message)) => {
                if attempt >= max_attempts {
                    return Err(LlmError::RateLimitExhausted {
                        attempts: attempt,
                        message,
                    });
                }
                let wait = delay(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    wait_secs = wait.as_secs_f64(),
                    "LLM rate limited, backing off"
                );
                tokio::time::sleep(wait).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_exponential_delay_doubles() {
        let delay = exponential_delay(2);
        assert_eq!(delay(1), Duration::from_secs(2));
        assert_eq!(delay(2), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_succeeds_after_rate_limits() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(
            3,
            |_| Duration::ZERO,
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(LlmError::RateLimited("slow down".to_string()))
                    } else {
                        Ok("done")
                    }
                }
            },
        )
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let waits = Mutex::new(Vec::new());
        let result: Result<(), LlmError> = retry_with_backoff(
            3,
            |attempt| {
                waits.lock().unwrap().push(attempt);
                Duration::ZERO
            },
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(LlmError::RateLimited("429".to_string())) }
            },
        )
        .await;

        assert_eq!(
            result,
            Err(LlmError::RateLimitExhausted {
                attempts: 3,
                message: "429".to_string()
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 最后一次失败后不再等待
        assert_eq!(*waits.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_other_failures_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), LlmError> = retry_with_backoff(
            3,
            |_| Duration::ZERO,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(LlmError::Failed("bad request".to_string())) }
            },
        )
        .await;

        assert_eq!(result, Err(LlmError::Failed("bad request".to_string())));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
