//! # Step Guard
//!
//! Wraps each awaited acquisition step so it can be abandoned when the view
//! is torn down, and optionally bounded in time.
//!
//! ```text
//! guard.run("play", session.play())
//!        │
//!        ├── token already cancelled ──► Err(Cancelled { step })
//!        ├── token fires while pending ─► Err(Cancelled { step })
//!        ├── timeout elapses ───────────► Err(Timeout { step, secs })
//!        └── step completes ────────────► step's own result
//! ```

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{SessionError, SessionResult};

/// Cancellation and timeout policy shared by every step of one session.
#[derive(Debug, Clone)]
pub struct StepGuard {
    token: CancellationToken,
    timeout: Option<Duration>,
}

impl StepGuard {
    pub fn new(token: CancellationToken, timeout: Option<Duration>) -> Self {
        StepGuard { token, timeout }
    }

    /// Fails with `Cancelled` if teardown was requested.
    pub fn check(&self, step: &'static str) -> SessionResult<()> {
        if self.token.is_cancelled() {
            Err(SessionError::Cancelled { step })
        } else {
            Ok(())
        }
    }

    /// Runs one step under the guard.
    ///
    /// Cancellation wins over a step that completes in the same poll.
    pub async fn run<T, F>(&self, step: &'static str, fut: F) -> SessionResult<T>
    where
        F: Future<Output = SessionResult<T>>,
    {
        self.check(step)?;

        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                    SessionError::Timeout {
                        step,
                        secs: limit.as_secs(),
                    }
                })?,
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(SessionError::Cancelled { step }),
            result = bounded => result,
        }
    }
}
