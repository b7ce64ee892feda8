use async_trait::async_trait;
use std::time::Duration;

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

/// Valkey/Redis-backed cache client.
///
/// Shared between processes, so several gate instances behind a load balancer
/// see the same validated tokens.
#[derive(Clone)]
pub struct ValkeyClient {
    manager: redis::aio::ConnectionManager,
}

impl std::fmt::Debug for ValkeyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValkeyClient").finish_non_exhaustive()
    }
}

impl ValkeyClient {
    // Create a Valkey client from a URL like `redis://localhost:6379`
    pub async fn new(url: &str) -> Result<Self, CacheError> {
        let client =
            redis::Client::open(url).map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheClient for ValkeyClient {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.manager.clone();

        let resp: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendCommand(e.to_string()))?;

        Ok(resp)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let ttl_millis = px_millis(ttl)?;
        let mut conn = self.manager.clone();

        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_millis)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendCommand(e.to_string()))?;

        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<u64> {
        let mut conn = self.manager.clone();

        // DEL returns number of keys removed (0 or 1 for a single key).
        let n: u64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendCommand(e.to_string()))?;

        Ok(n)
    }
}

/// TTL argument for `SET key value PX <ms>`.
///
/// Sub-millisecond remainders are truncated, never rounded up, so an entry
/// never outlives the token it holds. Anything under 1ms is refused.
fn px_millis(ttl: Duration) -> CacheResult<u64> {
    let millis = u64::try_from(ttl.as_millis())
        .map_err(|_| CacheError::InvalidValue(format!("ttl out of range: {ttl:?}")))?;
    if millis == 0 {
        return Err(CacheError::InvalidValue("ttl must be at least 1ms".to_string()));
    }
    Ok(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn px_truncates_to_whole_milliseconds() {
        assert_eq!(px_millis(Duration::from_secs(300)).unwrap(), 300_000);
        assert_eq!(px_millis(Duration::from_micros(1_999)).unwrap(), 1);
    }

    #[test]
    fn px_refuses_sub_millisecond_ttl() {
        assert!(matches!(
            px_millis(Duration::ZERO),
            Err(CacheError::InvalidValue(_))
        ));
        assert!(matches!(
            px_millis(Duration::from_micros(999)),
            Err(CacheError::InvalidValue(_))
        ));
    }

    #[test]
    fn px_refuses_out_of_range_ttl() {
        assert!(matches!(
            px_millis(Duration::MAX),
            Err(CacheError::InvalidValue(_))
        ));
    }
}
