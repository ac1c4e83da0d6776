//! Cooperative cancellation.
//!
//! A [`CancellationToken`] is handed down from the caller to an evaluation.
//! Persisted-store evaluators watch it while their query is in flight and
//! abandon the query when it fires; the in-memory evaluator only checks it
//! before starting.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

use crate::error::{EvaluationError, StorageResult};

struct TokenState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// A cloneable cancellation signal. All clones observe the same state.
#[derive(Clone)]
pub struct CancellationToken {
    state: Arc<TokenState>,
}

impl CancellationToken {
    /// Creates a token that has not fired.
    pub fn new() -> Self {
        Self {
            state: Arc::new(TokenState {
                cancelled: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    /// Fires the token. Idempotent.
    pub fn cancel(&self) {
        if !self.state.cancelled.swap(true, Ordering::SeqCst) {
            self.state.notify.notify_waiters();
        }
    }

    /// Returns true once the token has fired.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Completes when the token fires.
    pub async fn cancelled(&self) {
        loop {
            // Register interest before re-checking the flag so a concurrent
            // cancel() cannot slip between the check and the wait.
            let notified = self.state.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Returns `Cancelled` if the token has fired.
    pub fn check(&self) -> StorageResult<()> {
        if self.is_cancelled() {
            Err(EvaluationError::Cancelled.into())
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Checks an optional token.
pub(crate) fn check_cancelled(cancel: Option<&CancellationToken>) -> StorageResult<()> {
    cancel.map_or(Ok(()), CancellationToken::check)
}
