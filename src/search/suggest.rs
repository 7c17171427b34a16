//! Query suggestions and input debouncing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;
pub const SUGGESTION_DEBOUNCE: Duration = Duration::from_millis(300);

/// Popular searches, Vietnamese first.
pub const DEFAULT_VOCABULARY: &[&str] = &[
    "iPhone 15 Pro Max",
    "iPhone 15",
    "Samsung Galaxy S24 Ultra",
    "Samsung Galaxy A55",
    "Xiaomi 14",
    "OPPO Reno11",
    "MacBook Air M3",
    "MacBook Pro",
    "laptop gaming",
    "laptop văn phòng",
    "iPad Pro",
    "máy tính bảng",
    "tai nghe bluetooth",
    "tai nghe chống ồn",
    "AirPods Pro",
    "đồng hồ thông minh",
    "Apple Watch",
    "sạc dự phòng",
    "cáp sạc nhanh",
    "loa bluetooth",
    "bàn phím cơ",
    "chuột không dây",
    "máy ảnh Sony",
    "ốp lưng iPhone",
];

#[derive(Debug, Clone)]
pub struct Suggester {
    vocabulary: Vec<String>,
    limit: usize,
}

impl Default for Suggester {
    fn default() -> Self { Self::new(DEFAULT_VOCABULARY.iter().map(|s| s.to_string()).collect(), DEFAULT_SUGGESTION_LIMIT) }
}

impl Suggester {
    pub fn new(vocabulary: Vec<String>, limit: usize) -> Self { Self { vocabulary, limit } }

    pub fn with_limit(mut self, limit: usize) -> Self { self.limit = limit; self }

    pub fn limit(&self) -> usize { self.limit }

    /// Vocabulary entries containing `query`, case-insensitively, in vocabulary order.
    pub fn suggest(&self, query: &str) -> Vec<String> {
        let q = query.trim().to_lowercase();
        if q.is_empty() { return vec![]; }
        self.vocabulary.iter().filter(|s| s.to_lowercase().contains(&q)).take(self.limit).cloned().collect()
    }
}

/// Runs work only after input has been quiet for `delay`.
///
/// Each call takes a ticket; once the delay passes, a call whose ticket is no
/// longer the latest yields `None` and its work is skipped.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    latest: Arc<AtomicU64>,
}

impl Default for Debouncer {
    fn default() -> Self { Self::new(SUGGESTION_DEBOUNCE) }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self { Self { delay, latest: Arc::new(AtomicU64::new(0)) } }

    pub async fn run<F, T>(&self, work: F) -> Option<T>
    where
        F: FnOnce() -> T,
    {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if self.latest.load(Ordering::SeqCst) != ticket {
            return None;
        }
        Some(work())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestions_are_case_insensitive_and_capped() {
        let s = Suggester::default();
        assert_eq!(s.suggest("IPHONE"), vec!["iPhone 15 Pro Max", "iPhone 15", "ốp lưng iPhone"]);
        assert_eq!(s.clone().with_limit(1).suggest("iphone"), vec!["iPhone 15 Pro Max"]);
        assert!(s.suggest("   ").is_empty());
        assert_eq!(s.suggest("TAI NGHE").len(), 2);
    }

    #[tokio::test]
    async fn test_superseded_call_is_dropped() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let first = {
            let d = debouncer.clone();
            tokio::spawn(async move { d.run(|| "ip").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = debouncer.run(|| "iphone").await;
        assert_eq!(first.await.unwrap(), None);
        assert_eq!(second, Some("iphone"));
    }
}
