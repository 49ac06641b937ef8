/// Paging context - which paging intent is in effect for the current call chain
///
/// Every marked handler pushes a `Paged` intent for the duration of its body.
/// Queries consult the top of the stack to decide whether to paginate, so code
/// inside a paged handler can run auxiliary lookups at full size by wrapping
/// them in [`PagingContext::with_skip`].
///
/// Stacks are chain-local: one per thread for synchronous code, one per
/// task inside [`PagingContext::scope`] for async code. Nothing is shared
/// between chains, so no locking is involved.

mod stack;

pub use stack::Frame;

use crate::core::{PagerError, PagingIntent};
use std::future::Future;
use stack::Storage;

pub struct PagingContext;

impl PagingContext {
    /// Pushes `intent`; the returned guard pops it when dropped
    ///
    /// Outside [`Self::scope`] the frame lands on the thread-local stack, so
    /// the guard must not be held across an `.await` there.
    #[must_use = "dropping the guard pops the intent immediately"]
    pub fn push(intent: PagingIntent) -> IntentGuard {
        let storage = stack::active();
        stack::push(storage, Frame::new(intent));
        tracing::trace!(?intent, depth = stack::depth(), "paging intent pushed");
        IntentGuard { storage, closed: false }
    }

    /// Top-of-stack intent, `None` when no frame is open on this chain
    #[must_use]
    pub fn current() -> Option<PagingIntent> {
        stack::top().map(|frame| frame.intent)
    }

    /// Intent queries should obey. An empty stack means unpaged.
    #[must_use]
    pub fn effective() -> PagingIntent {
        Self::current().unwrap_or_else(PagingIntent::skipped)
    }

    #[must_use]
    pub fn depth() -> usize {
        stack::depth()
    }

    /// Records the total count a paged query reported against the top frame
    ///
    /// Ignored when the top frame is not `Paged`.
    pub fn record_total(total_count: i64) {
        stack::with(stack::active(), |frames| {
            if let Some(frame) = frames.last_mut().filter(|f| f.intent.is_paged()) {
                if let Some(previous) = frame.total_count {
                    tracing::debug!(previous, total_count, "paged query ran twice in one frame, keeping the last total");
                }
                frame.total_count = Some(total_count);
            }
        });
    }

    /// Runs `body` unpaged and restores the previous intent afterwards,
    /// including when `body` returns an error or panics
    pub fn with_skip<R>(body: impl FnOnce() -> R) -> R {
        let _guard = Self::push(PagingIntent::skipped());
        body()
    }

    /// Async form of [`Self::with_skip`]
    ///
    /// Outside a task scope the body gets a scope of its own, so the skipped
    /// frame travels with the future instead of sitting on a thread stack.
    pub async fn with_skip_async<F: Future>(fut: F) -> F::Output {
        Self::scope(async move {
            let _guard = Self::push(PagingIntent::skipped());
            fut.await
        })
        .await
    }

    /// Runs `fut` as its own call chain with a task-local stack. Reuses the
    /// enclosing task stack if one is already active.
    pub async fn scope<F: Future>(fut: F) -> F::Output {
        if stack::active() == Storage::Task {
            fut.await
        } else {
            stack::scoped(fut).await
        }
    }
}

/// Scoped release of one pushed intent
#[derive(Debug)]
pub struct IntentGuard {
    storage: Storage,
    closed: bool,
}

impl IntentGuard {
    /// Pops the frame now and returns it with any recorded total count
    pub fn close(mut self) -> Result<Frame, PagerError> {
        self.closed = true;
        let frame = stack::pop(self.storage)?;
        tracing::trace!(intent = ?frame.intent, "paging intent popped");
        Ok(frame)
    }
}

impl Drop for IntentGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = stack::pop(self.storage) {
            // Only reachable when a task scope ended before the guard did
            tracing::error!(%err, "paging intent guard outlived its stack");
            debug_assert!(std::thread::panicking() || self.storage == Storage::Task, "{err}");
        }
    }
}
