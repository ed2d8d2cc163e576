//! Connectivity check used by the settings page's "Test connection" button.
//!
//! The check itself is an outbound HTTP round-trip implemented in
//! `infrastructure::connectivity`.  This module defines the seam: the
//! [`ConnectivityChecker`] trait and [`check_with_timeout`], which bounds the
//! call so a hung endpoint cannot stall the request indefinitely.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

/// The endpoint and credential to test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    pub url: String,
    pub token: Option<String>,
}

/// Reports whether an endpoint is reachable and accepts the token.
///
/// Implementations absorb their own failures: any error means `false`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectivityChecker: Send + Sync {
    async fn test_authentication(&self, endpoint: ApiEndpoint) -> bool;
}

/// Runs `checker` against `endpoint`, treating a check that outlives
/// `timeout` as a failed authentication.
pub async fn check_with_timeout(
    checker: &dyn ConnectivityChecker,
    endpoint: ApiEndpoint,
    timeout: Duration,
) -> bool {
    match tokio::time::timeout(timeout, checker.test_authentication(endpoint)).await {
        Ok(authenticated) => authenticated,
        Err(_) => {
            warn!(?timeout, "connectivity check timed out");
            false
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn endpoint() -> ApiEndpoint {
        ApiEndpoint {
            url: "http://example.com/".to_string(),
            token: Some("admin_token".to_string()),
        }
    }

    struct HangingChecker;

    #[async_trait]
    impl ConnectivityChecker for HangingChecker {
        async fn test_authentication(&self, _endpoint: ApiEndpoint) -> bool {
            tokio::time::sleep(Duration::from_secs(30)).await;
            true
        }
    }

    #[tokio::test]
    async fn test_check_returns_checker_result() {
        // Arrange
        let mut checker = MockConnectivityChecker::new();
        checker
            .expect_test_authentication()
            .with(eq(endpoint()))
            .times(1)
            .return_const(true);

        // Act
        let result = check_with_timeout(&checker, endpoint(), Duration::from_secs(1)).await;

        // Assert
        assert!(result);
    }

    #[tokio::test]
    async fn test_check_passes_through_rejection() {
        let mut checker = MockConnectivityChecker::new();
        checker.expect_test_authentication().return_const(false);
        assert!(!check_with_timeout(&checker, endpoint(), Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_check_that_times_out_is_not_authenticated() {
        let result =
            check_with_timeout(&HangingChecker, endpoint(), Duration::from_millis(20)).await;
        assert!(!result);
    }
}
