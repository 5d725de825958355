/// Activity feed cache
///
/// Board history pages are expensive to compute server-side (three
/// joins plus a count), so the client caches each fetched page keyed by
/// `(board_id, page)` with a short TTL. A reader asks the cache, not
/// the server; the cache refetches only on miss or expiry.
///
/// When an `activity-updated` event arrives for a board, every cached
/// page for that board is dropped. The page the user currently has open
/// (if any) is refetched immediately so the feed updates in place, and
/// a one-item probe of page 1 detects whether a genuinely new entry
/// exists. Repeated events for the same newest entry notify only once.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use boardcast_shared::models::activity::ActivityPage;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// How long a cached page stays valid
pub const PAGE_TTL: Duration = Duration::from_secs(5 * 60);

/// Page size used when probing for new activity
const PROBE_PAGE_SIZE: u32 = 1;

/// Errors surfaced by activity fetching
#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("activity fetch failed: {0}")]
    Fetch(String),
}

/// Source of activity pages, usually the HTTP API
#[async_trait]
pub trait ActivityFetcher: Send + Sync {
    async fn fetch_page(
        &self,
        board_id: Uuid,
        page: u32,
        page_size: u32,
    ) -> Result<ActivityPage, ActivityError>;
}

/// Sink for "new activity" notifications, usually the UI layer
pub trait Notifier: Send + Sync {
    fn notify_new_activity(&self, board_id: Uuid);
}

struct CachedPage {
    page: ActivityPage,
    fetched_at: Instant,
}

impl CachedPage {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < PAGE_TTL
    }
}

/// TTL cache over activity pages with change notifications
pub struct ActivityCache<F, N> {
    fetcher: F,
    notifier: N,
    pages: HashMap<(Uuid, u32), CachedPage>,

    /// Newest activity id we have already notified about, per board
    last_notified: HashMap<Uuid, Uuid>,
}

impl<F: ActivityFetcher, N: Notifier> ActivityCache<F, N> {
    pub fn new(fetcher: F, notifier: N) -> Self {
        Self {
            fetcher,
            notifier,
            pages: HashMap::new(),
            last_notified: HashMap::new(),
        }
    }

    /// Returns a page of board history, from cache when fresh
    pub async fn page(
        &mut self,
        board_id: Uuid,
        page: u32,
        page_size: u32,
    ) -> Result<&ActivityPage, ActivityError> {
        let key = (board_id, page);
        let stale = self.pages.get(&key).map_or(true, |c| !c.is_fresh());
        if stale {
            debug!(%board_id, page, "activity cache miss, fetching");
            let fetched = self.fetcher.fetch_page(board_id, page, page_size).await?;
            self.pages.insert(key, CachedPage { page: fetched, fetched_at: Instant::now() });
        }
        Ok(&self.pages[&key].page)
    }

    /// Drops every cached page for a board
    pub fn invalidate_board(&mut self, board_id: Uuid) {
        self.pages.retain(|(b, _), _| *b != board_id);
    }

    /// Reacts to an `activity-updated` event
    ///
    /// Invalidates the board's pages, refetches the page the user has
    /// open so it updates in place, and probes page 1 to decide whether
    /// to raise a notification. Each distinct newest entry notifies at
    /// most once, however many events reference it.
    pub async fn on_activity_updated(
        &mut self,
        board_id: Uuid,
        open_page: Option<(u32, u32)>,
    ) -> Result<(), ActivityError> {
        self.invalidate_board(board_id);

        if let Some((page, page_size)) = open_page {
            self.page(board_id, page, page_size).await?;
        }

        let probe = self.fetcher.fetch_page(board_id, 1, PROBE_PAGE_SIZE).await?;
        let Some(newest) = probe.items.first() else {
            return Ok(());
        };

        if self.last_notified.get(&board_id) != Some(&newest.id) {
            self.last_notified.insert(board_id, newest.id);
            self.notifier.notify_new_activity(board_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardcast_shared::models::activity::ActivityView;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn view(id: Uuid) -> ActivityView {
        ActivityView {
            id,
            action: "created task \"x\"".to_string(),
            created_at: Utc::now(),
            user_name: Some("Ada".to_string()),
            user_email: "ada@example.com".to_string(),
            task_content: "x".to_string(),
        }
    }

    fn page_of(items: Vec<ActivityView>, page: u32, page_size: u32) -> ActivityPage {
        let total = items.len() as i64;
        ActivityPage { items, page, page_size, total, total_pages: 1 }
    }

    struct FakeFetcher {
        newest: Arc<Mutex<Option<Uuid>>>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ActivityFetcher for FakeFetcher {
        async fn fetch_page(
            &self,
            _board_id: Uuid,
            page: u32,
            page_size: u32,
        ) -> Result<ActivityPage, ActivityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let items = self.newest.lock().unwrap().map(view).into_iter().collect();
            Ok(page_of(items, page, page_size))
        }
    }

    struct FakeNotifier {
        count: Arc<AtomicUsize>,
    }

    impl Notifier for FakeNotifier {
        fn notify_new_activity(&self, _board_id: Uuid) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn cache(
        newest: Option<Uuid>,
    ) -> (ActivityCache<FakeFetcher, FakeNotifier>, Arc<AtomicUsize>, Arc<AtomicUsize>, Arc<Mutex<Option<Uuid>>>) {
        let newest = Arc::new(Mutex::new(newest));
        let calls = Arc::new(AtomicUsize::new(0));
        let notifications = Arc::new(AtomicUsize::new(0));
        let cache = ActivityCache::new(
            FakeFetcher { newest: newest.clone(), calls: calls.clone() },
            FakeNotifier { count: notifications.clone() },
        );
        (cache, calls, notifications, newest)
    }

    #[tokio::test]
    async fn test_fresh_page_served_from_cache() {
        let (mut cache, calls, _, _) = cache(Some(Uuid::new_v4()));
        let board = Uuid::new_v4();

        cache.page(board, 1, 20).await.unwrap();
        cache.page(board, 1, 20).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_page_refetches() {
        let (mut cache, calls, _, _) = cache(Some(Uuid::new_v4()));
        let board = Uuid::new_v4();

        cache.page(board, 1, 20).await.unwrap();
        tokio::time::advance(PAGE_TTL + Duration::from_secs(1)).await;
        cache.page(board, 1, 20).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_distinct_pages_cached_separately() {
        let (mut cache, calls, _, _) = cache(Some(Uuid::new_v4()));
        let board = Uuid::new_v4();

        cache.page(board, 1, 20).await.unwrap();
        cache.page(board, 2, 20).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_activity_updated_invalidates_and_refetches_open_page() {
        let (mut cache, calls, _, _) = cache(Some(Uuid::new_v4()));
        let board = Uuid::new_v4();

        cache.page(board, 1, 20).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // One refetch of the open page plus the probe
        cache.on_activity_updated(board, Some((1, 20))).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        // The refetched page is fresh again
        cache.page(board, 1, 20).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_repeated_events_for_same_entry_notify_once() {
        let newest_id = Uuid::new_v4();
        let (mut cache, _, notifications, newest) = cache(Some(newest_id));
        let board = Uuid::new_v4();

        cache.on_activity_updated(board, None).await.unwrap();
        cache.on_activity_updated(board, None).await.unwrap();
        assert_eq!(notifications.load(Ordering::SeqCst), 1);

        // A genuinely new entry notifies again
        *newest.lock().unwrap() = Some(Uuid::new_v4());
        cache.on_activity_updated(board, None).await.unwrap();
        assert_eq!(notifications.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_history_never_notifies() {
        let (mut cache, _, notifications, _) = cache(None);
        let board = Uuid::new_v4();

        cache.on_activity_updated(board, None).await.unwrap();
        assert_eq!(notifications.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalidation_scoped_to_one_board() {
        let (mut cache, calls, _, _) = cache(Some(Uuid::new_v4()));
        let board_a = Uuid::new_v4();
        let board_b = Uuid::new_v4();

        cache.page(board_a, 1, 20).await.unwrap();
        cache.page(board_b, 1, 20).await.unwrap();
        cache.invalidate_board(board_a);

        cache.page(board_b, 1, 20).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        cache.page(board_a, 1, 20).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
