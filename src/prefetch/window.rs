use std::collections::HashSet;

use crate::domain::{FeedItem, stable_key};

/// 以当前条目为锚点、只向前延伸的保留窗口 `[current, end]`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchWindow {
    pub current: usize,
    pub end: usize,
}

impl PrefetchWindow {
    /// 列表为空或索引越界时返回 `None`。
    pub fn compute(current: usize, len: usize, cache_window: usize) -> Option<Self> {
        if len == 0 || current >= len {
            return None;
        }
        let end = current.saturating_add(cache_window).min(len - 1);
        Some(Self { current, end })
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.current..=self.end).contains(&index)
    }

    /// 紧邻的下一条
    pub fn next_index(&self) -> Option<usize> {
        let next = self.current + 1;
        (next <= self.end).then_some(next)
    }

    /// 窗口内条目的稳定 key 集合。
    pub fn keep_keys(&self, items: &[FeedItem]) -> HashSet<String> {
        items[self.current..=self.end].iter().map(stable_key).collect()
    }

    /// 预取优先级：先 `current + 1`，再 `current + 2 ..= end` 升序。
    pub fn priority_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.end - self.current);
        if let Some(next) = self.next_index() {
            order.push(next);
        }
        order.extend(self.current + 2..=self.end);
        order
    }
}
