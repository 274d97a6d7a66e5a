use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// 実行時にコマンドから変更できる年オフセット。clone したものは同じ値を共有する。
#[derive(Debug, Clone)]
pub struct YearOffset(Arc<AtomicI64>);

impl YearOffset {
    pub fn new(offset: i64) -> Self {
        Self(Arc::new(AtomicI64::new(offset)))
    }

    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, offset: i64) {
        self.0.store(offset, Ordering::Relaxed);
    }
}
