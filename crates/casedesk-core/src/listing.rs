//! Public listing cache
//!
//! The public case-studies page is read far more often than it changes,
//! so the card listing is cached in memory until a mutation invalidates
//! it. Invalidation is the only coherence mechanism; there is no TTL.

use casedesk_db::CaseStudyCard;
use parking_lot::RwLock;
use tracing::debug;

/// Cached snapshot of the public listing.
#[derive(Default)]
pub struct ListingCache {
    cards: RwLock<Option<Vec<CaseStudyCard>>>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached listing, if warm.
    pub fn get(&self) -> Option<Vec<CaseStudyCard>> {
        self.cards.read().clone()
    }

    /// Fill the cache with a fresh listing.
    pub fn store(&self, cards: Vec<CaseStudyCard>) {
        *self.cards.write() = Some(cards);
    }

    /// Drop the snapshot. Called after every successful create, update,
    /// or delete.
    pub fn invalidate(&self) {
        debug!("Invalidating case-study listing cache");
        *self.cards.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn card(id: i64) -> CaseStudyCard {
        CaseStudyCard {
            id,
            thumbnail_image_url: "https://cdn.example.com/t.png".to_string(),
            thumbnail_title: "t".to_string(),
            service_type: "s".to_string(),
            case_study_title: "title".to_string(),
            case_study_subtitle: "subtitle".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_cold_cache_is_empty() {
        let cache = ListingCache::new();
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_store_then_get() {
        let cache = ListingCache::new();
        cache.store(vec![card(1), card(2)]);

        let cards = cache.get().unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].id, 1);
    }

    #[test]
    fn test_invalidate_clears() {
        let cache = ListingCache::new();
        cache.store(vec![card(1)]);
        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
