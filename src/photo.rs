//! Photo fetching and object-URL lifecycle
//!
//! Quiz and question photos arrive as binary blobs and are handed to the
//! host to wrap as local object URLs. Those URLs hold memory until
//! revoked, so the cache is the sole owner of every URL it creates:
//! consumers only ever read them. A superseded URL (the same entity
//! fetched again, e.g. after a re-upload) is revoked immediately after
//! the swap, and a reset revokes everything, so un-revoked URLs can never
//! accumulate. At most one fetch per entity is in flight at a time.

use std::collections::{HashMap, HashSet};

use enum_map::{Enum, EnumMap};
use serde::{Deserialize, Serialize};

use crate::{
    Method, constants,
    quiz::model::{Question, QuestionId, QuizId},
    transport::Transport,
};

/// Which kind of entity a photo belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum PhotoKind {
    /// A quiz cover photo
    Quiz,
    /// A question illustration
    Question,
}

impl PhotoKind {
    /// The path segment used by the photo endpoints
    fn segment(self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Question => "question",
        }
    }
}

/// Identifies one logical photo: an entity kind plus its numeric ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoKey {
    /// The owning entity kind
    pub kind: PhotoKind,
    /// The owning entity's numeric ID
    pub id: u64,
}

impl PhotoKey {
    /// The photo of a quiz
    pub fn quiz(id: QuizId) -> Self {
        Self {
            kind: PhotoKind::Quiz,
            id: id.0,
        }
    }

    /// The photo of a question
    pub fn question(id: QuestionId) -> Self {
        Self {
            kind: PhotoKind::Question,
            id: id.0,
        }
    }
}

/// Network requests issued by the photo cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Request {
    /// Fetch the binary photo of an entity
    FetchPhoto {
        /// The photo to fetch
        key: PhotoKey,
    },
}

impl Request {
    /// The HTTP method of this request
    pub fn method(&self) -> Method {
        match self {
            Self::FetchPhoto { .. } => Method::Get,
        }
    }

    /// The REST path of this request
    pub fn path(&self) -> String {
        match self {
            Self::FetchPhoto { key } => {
                format!("/{}/{}/photo", key.kind.segment(), key.id)
            }
        }
    }
}

/// Trait for creating and revoking local object URLs
///
/// Backed by `URL.createObjectURL` / `URL.revokeObjectURL` in the real
/// client. The cache is the only caller of `revoke`; for every URL it
/// hands out, exactly one revoke eventually follows.
pub trait UrlRegistry {
    /// Wraps binary data as a local object URL
    fn create(&self, bytes: &[u8]) -> String;

    /// Revokes a URL previously returned by `create`, freeing its memory
    fn revoke(&self, url: &str);
}

/// Cache of object URLs for quiz and question photos
///
/// Owns every URL it creates. Consumers read URLs via [`PhotoCache::url`]
/// and must treat a URL as gone after any release or reset.
#[derive(Debug, Default)]
pub struct PhotoCache {
    /// Current object URL per entity
    urls: EnumMap<PhotoKind, HashMap<u64, String>>,
    /// Entities with a fetch currently in flight
    in_flight: EnumMap<PhotoKind, HashSet<u64>>,
}

impl PhotoCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the photo of an entity, deduplicating redundant fetches
    ///
    /// Returns `true` if a fetch was dispatched; `false` when the photo
    /// is already cached or a fetch for it is already in flight.
    pub fn request<T: Transport>(&mut self, key: PhotoKey, transport: &T) -> bool {
        if self.urls[key.kind].contains_key(&key.id) || !self.in_flight[key.kind].insert(key.id) {
            return false;
        }
        transport.dispatch(&Request::FetchPhoto { key }.into());
        true
    }

    /// Requests photos for the questions around the cursor
    ///
    /// Covers the window `cursor ± PREFETCH_RADIUS`, skipping questions
    /// without a photo; dedup applies per entity as usual.
    pub fn prefetch<T: Transport>(
        &mut self,
        questions: &[Question],
        cursor: usize,
        transport: &T,
    ) {
        let radius = constants::photo::PREFETCH_RADIUS;
        let start = cursor.saturating_sub(radius);
        let end = (cursor + radius).min(questions.len().saturating_sub(1));
        for question in questions.iter().take(end + 1).skip(start) {
            if question.has_photo {
                self.request(PhotoKey::question(question.id), transport);
            }
        }
    }

    /// Feeds in fetched photo bytes, swapping in a fresh object URL
    ///
    /// A superseded URL for the same entity is revoked immediately after
    /// the swap; the old and new URL are never both current.
    pub fn receive<R: UrlRegistry>(&mut self, key: PhotoKey, bytes: &[u8], registry: &R) {
        self.in_flight[key.kind].remove(&key.id);
        let url = registry.create(bytes);
        if let Some(previous) = self.urls[key.kind].insert(key.id, url) {
            registry.revoke(&previous);
        }
    }

    /// Surfaces a failed photo fetch
    ///
    /// Clears the in-flight marker so a later request may retry; photos
    /// are decorative, so the failure is logged and swallowed.
    pub fn receive_failure(&mut self, key: PhotoKey, message: &str) {
        self.in_flight[key.kind].remove(&key.id);
        tracing::debug!(?key, %message, "photo fetch failed");
    }

    /// The current object URL for an entity, if fetched
    pub fn url(&self, key: PhotoKey) -> Option<&str> {
        self.urls[key.kind].get(&key.id).map(String::as_str)
    }

    /// Releases the URL of one entity
    pub fn release<R: UrlRegistry>(&mut self, key: PhotoKey, registry: &R) {
        if let Some(url) = self.urls[key.kind].remove(&key.id) {
            registry.revoke(&url);
        }
    }

    /// Releases every URL currently held (unmount or session reset)
    pub fn release_all<R: UrlRegistry>(&mut self, registry: &R) {
        for (_, urls) in &mut self.urls {
            for (_, url) in urls.drain() {
                registry.revoke(&url);
            }
        }
        for (_, in_flight) in &mut self.in_flight {
            in_flight.clear();
        }
    }

    /// Number of URLs currently held by the cache
    pub fn outstanding(&self) -> usize {
        self.urls.values().map(HashMap::len).sum()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::quiz::model::{Answer, AnswerId};
    use crate::transport::testing::RecordingTransport;

    /// Registry fake that tracks which created URLs are still alive
    #[derive(Default)]
    struct CountingRegistry {
        created: RefCell<usize>,
        alive: RefCell<Vec<String>>,
    }

    impl CountingRegistry {
        fn alive_count(&self) -> usize {
            self.alive.borrow().len()
        }
    }

    impl UrlRegistry for CountingRegistry {
        fn create(&self, _bytes: &[u8]) -> String {
            let mut created = self.created.borrow_mut();
            *created += 1;
            let url = format!("blob:{created}");
            self.alive.borrow_mut().push(url.clone());
            url
        }

        fn revoke(&self, url: &str) {
            let mut alive = self.alive.borrow_mut();
            let position = alive
                .iter()
                .position(|candidate| candidate == url)
                .expect("revoked a URL that is not alive");
            alive.remove(position);
        }
    }

    fn question(id: u64, has_photo: bool) -> Question {
        Question {
            id: QuestionId(id),
            text: format!("question {id}"),
            has_photo,
            answers: vec![Answer {
                id: AnswerId(id * 10),
                text: "option".to_owned(),
                is_correct: None,
            }],
        }
    }

    #[test]
    fn test_request_paths() {
        assert_eq!(
            Request::FetchPhoto {
                key: PhotoKey::quiz(QuizId(42))
            }
            .path(),
            "/quiz/42/photo"
        );
        assert_eq!(
            Request::FetchPhoto {
                key: PhotoKey::question(QuestionId(7))
            }
            .path(),
            "/question/7/photo"
        );
    }

    #[test]
    fn test_request_deduplicates_in_flight_fetches() {
        let transport = RecordingTransport::new();
        let mut cache = PhotoCache::new();
        let key = PhotoKey::quiz(QuizId(42));

        assert!(cache.request(key, &transport));
        assert!(!cache.request(key, &transport));
        assert_eq!(transport.len(), 1);
    }

    #[test]
    fn test_request_skips_already_cached_photos() {
        let transport = RecordingTransport::new();
        let registry = CountingRegistry::default();
        let mut cache = PhotoCache::new();
        let key = PhotoKey::quiz(QuizId(42));

        cache.request(key, &transport);
        cache.receive(key, b"png", &registry);
        transport.clear();

        assert!(!cache.request(key, &transport));
        assert_eq!(transport.len(), 0);
    }

    #[test]
    fn test_same_id_different_kind_does_not_collide() {
        let transport = RecordingTransport::new();
        let mut cache = PhotoCache::new();

        assert!(cache.request(PhotoKey::quiz(QuizId(7)), &transport));
        assert!(cache.request(PhotoKey::question(QuestionId(7)), &transport));
        assert_eq!(transport.len(), 2);
    }

    #[test]
    fn test_receive_supersede_revokes_old_url_once() {
        let transport = RecordingTransport::new();
        let registry = CountingRegistry::default();
        let mut cache = PhotoCache::new();
        let key = PhotoKey::quiz(QuizId(42));

        cache.request(key, &transport);
        cache.receive(key, b"old", &registry);
        let old_url = cache.url(key).unwrap().to_owned();

        // Re-upload: a fresh fetch replaces the current URL
        cache.request(key, &transport);
        cache.receive(key, b"new", &registry);

        assert_ne!(cache.url(key).unwrap(), old_url);
        assert_eq!(registry.alive_count(), 1);
    }

    #[test]
    fn test_release_all_leaves_no_outstanding_urls() {
        let transport = RecordingTransport::new();
        let registry = CountingRegistry::default();
        let mut cache = PhotoCache::new();

        for id in 1..=5 {
            let key = PhotoKey::question(QuestionId(id));
            cache.request(key, &transport);
            cache.receive(key, b"png", &registry);
        }
        assert_eq!(cache.outstanding(), 5);

        cache.release_all(&registry);

        assert_eq!(cache.outstanding(), 0);
        assert_eq!(registry.alive_count(), 0);
    }

    #[test]
    fn test_release_is_idempotent_per_entity() {
        let transport = RecordingTransport::new();
        let registry = CountingRegistry::default();
        let mut cache = PhotoCache::new();
        let key = PhotoKey::quiz(QuizId(1));

        cache.request(key, &transport);
        cache.receive(key, b"png", &registry);
        cache.release(key, &registry);
        // Second release finds nothing to revoke
        cache.release(key, &registry);

        assert_eq!(registry.alive_count(), 0);
    }

    #[test]
    fn test_failure_clears_in_flight_for_retry() {
        let transport = RecordingTransport::new();
        let mut cache = PhotoCache::new();
        let key = PhotoKey::quiz(QuizId(1));

        cache.request(key, &transport);
        cache.receive_failure(key, "404 not found");

        assert!(cache.request(key, &transport));
        assert_eq!(transport.len(), 2);
    }

    #[test]
    fn test_prefetch_covers_the_cursor_window() {
        let transport = RecordingTransport::new();
        let mut cache = PhotoCache::new();
        let questions: Vec<_> = (1..=5).map(|id| question(id, true)).collect();

        cache.prefetch(&questions, 2, &transport);

        assert_eq!(
            transport.paths(),
            vec![
                "/question/2/photo".to_owned(),
                "/question/3/photo".to_owned(),
                "/question/4/photo".to_owned(),
            ]
        );
    }

    #[test]
    fn test_prefetch_clamps_at_the_edges() {
        let transport = RecordingTransport::new();
        let mut cache = PhotoCache::new();
        let questions: Vec<_> = (1..=3).map(|id| question(id, true)).collect();

        cache.prefetch(&questions, 0, &transport);
        assert_eq!(transport.len(), 2);

        transport.clear();
        let mut cache = PhotoCache::new();
        cache.prefetch(&questions, 2, &transport);
        assert_eq!(transport.len(), 2);
    }

    #[test]
    fn test_prefetch_skips_questions_without_photos() {
        let transport = RecordingTransport::new();
        let mut cache = PhotoCache::new();
        let questions = vec![question(1, true), question(2, false), question(3, true)];

        cache.prefetch(&questions, 1, &transport);

        assert_eq!(
            transport.paths(),
            vec![
                "/question/1/photo".to_owned(),
                "/question/3/photo".to_owned(),
            ]
        );
    }

    #[test]
    fn test_prefetch_is_deduplicated_across_calls() {
        let transport = RecordingTransport::new();
        let mut cache = PhotoCache::new();
        let questions: Vec<_> = (1..=5).map(|id| question(id, true)).collect();

        cache.prefetch(&questions, 1, &transport);
        cache.prefetch(&questions, 2, &transport);

        // Questions 1-3 were already requested by the first window
        assert_eq!(transport.len(), 4);
    }
}
