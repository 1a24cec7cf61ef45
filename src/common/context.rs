use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Cancellation signal plus optional deadline shared by one scan.
///
/// Cloning is cheap; every clone observes the same token.
#[derive(Debug, Clone, Default)]
pub struct ScanContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ScanContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        if self.token.is_cancelled() {
            return true;
        }
        matches!(self.deadline, Some(deadline) if Instant::now() >= deadline)
    }

    /// 等待取消信号或截止时间
    pub async fn cancelled(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {},
                    _ = sleep_until(deadline) => {},
                }
            },
            None => self.token.cancelled().await,
        }
    }
}
