/// Chain-local storage for paging frames
///
/// Synchronous call chains use a thread-local stack. Async call chains entered
/// through `PagingContext::scope` get a tokio task-local stack, which wins over
/// the thread-local one while the task runs so that frames follow the task
/// across worker threads.

use crate::core::{PagerError, PagingIntent};
use std::cell::RefCell;
use std::future::Future;

/// One pushed intent plus the total count reported by queries run under it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub intent: PagingIntent,
    pub total_count: Option<i64>,
}

impl Frame {
    pub const fn new(intent: PagingIntent) -> Self {
        Self { intent, total_count: None }
    }
}

type Stack = RefCell<Vec<Frame>>;

thread_local! {
    static THREAD_STACK: Stack = const { RefCell::new(Vec::new()) };
}

tokio::task_local! {
    static TASK_STACK: Stack;
}

/// Which stack a frame was pushed onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Task,
    Thread,
}

/// Storage that code running "right now" should use
pub fn active() -> Storage {
    if TASK_STACK.try_with(|_| ()).is_ok() {
        Storage::Task
    } else {
        Storage::Thread
    }
}

/// Runs `f` against the given stack. Returns `None` if that stack is no longer
/// reachable (thread teardown, or a task scope that already ended).
pub fn with<R>(storage: Storage, f: impl FnOnce(&mut Vec<Frame>) -> R) -> Option<R> {
    match storage {
        Storage::Task => TASK_STACK.try_with(|s| f(&mut s.borrow_mut())).ok(),
        Storage::Thread => THREAD_STACK.try_with(|s| f(&mut s.borrow_mut())).ok(),
    }
}

pub fn push(storage: Storage, frame: Frame) {
    with(storage, |stack| stack.push(frame));
}

pub fn pop(storage: Storage) -> Result<Frame, PagerError> {
    with(storage, Vec::pop)
        .flatten()
        .ok_or(PagerError::StackImbalance)
}

pub fn top() -> Option<Frame> {
    with(active(), |stack| stack.last().copied()).flatten()
}

pub fn depth() -> usize {
    with(active(), |stack| stack.len()).unwrap_or(0)
}

/// Runs `fut` with a fresh task-local stack
pub async fn scoped<F: Future>(fut: F) -> F::Output {
    TASK_STACK.scope(RefCell::new(Vec::new()), fut).await
}
