//! View lifetimes
//!
//! Every view owns a [`ViewScope`]. Work started inside the scope is
//! abandoned once the scope closes, and any result arriving afterwards is
//! dropped instead of being applied.

use std::future::Future;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fut` inside this scope; `None` when the scope closed first
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        let output = tokio::select! {
            _ = self.token.cancelled() => return None,
            output = fut => output,
        };

        if self.token.is_cancelled() {
            return None;
        }
        Some(output)
    }

    /// Tear the view down
    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Handle that closes this scope from elsewhere (e.g. a signal handler)
    pub fn closer(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_open_scope_returns_output() {
        let scope = ViewScope::new();
        assert_eq!(scope.run(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn test_closed_scope_discards_late_result() {
        let scope = ViewScope::new();
        let closer = scope.closer();

        let slow = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            "late"
        };
        let (result, _) = tokio::join!(scope.run(slow), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            closer.cancel();
        });

        assert_eq!(result, None);
        assert!(scope.is_closed());
    }

    #[tokio::test]
    async fn test_drop_closes() {
        let scope = ViewScope::new();
        let closer = scope.closer();
        drop(scope);
        assert!(closer.is_cancelled());
    }
}
