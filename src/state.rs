use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Per-invocation run state: cancel flag plus build progress / 运行状态
///
/// Cloning shares the same flag, so the signal handler and the running pass
/// observe the same cancellation.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    inner: Arc<RunStateInner>,
}

#[derive(Debug, Default)]
struct RunStateInner {
    cancel_flag: AtomicBool,
    object_count: AtomicU64,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancel_flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancel_flag.load(Ordering::SeqCst)
    }

    /// Fail with `Cancelled` once the flag is set / 已取消时返回错误
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Count one indexed document, returning the new total / 已索引文档计数
    pub fn increment(&self) -> u64 {
        self.inner.object_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn object_count(&self) -> u64 {
        self.inner.object_count.load(Ordering::SeqCst)
    }
}
