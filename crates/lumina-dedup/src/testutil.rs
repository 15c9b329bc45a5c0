//! In-memory repository fakes for engine tests.
//!
//! `MemoryStore` implements both repository traits over mutex-held maps and
//! supports injecting per-call store failures, so executor behavior under
//! partial write failure is testable without a database.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use uuid::Uuid;

use lumina_core::{
    similarity_score, CaptureMetadata, DuplicatePair, DuplicatePairRepository, Error, Media,
    MediaRepository, PairWithMedia, Result,
};

pub struct MemoryStore {
    media: Mutex<BTreeMap<Uuid, Media>>,
    pairs: Mutex<Vec<DuplicatePair>>,
    fail_delete_ids: Mutex<HashSet<Uuid>>,
    fail_retires: AtomicBool,
    fail_listing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            media: Mutex::new(BTreeMap::new()),
            pairs: Mutex::new(Vec::new()),
            fail_delete_ids: Mutex::new(HashSet::new()),
            fail_retires: AtomicBool::new(false),
            fail_listing: AtomicBool::new(false),
        }
    }

    pub fn add_media(&self, media: Media) {
        self.media.lock().unwrap().insert(media.id, media);
    }

    pub fn add_pair(&self, media_id: Uuid, duplicate_id: Uuid, distance: i32) {
        self.pairs.lock().unwrap().push(DuplicatePair {
            media_id,
            duplicate_id,
            hamming_distance: distance,
            similarity_score: similarity_score(distance.max(0) as u32, 16),
            created_at: Utc::now(),
        });
    }

    pub fn media_snapshot(&self, id: Uuid) -> Option<Media> {
        self.media.lock().unwrap().get(&id).cloned()
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.lock().unwrap().len()
    }

    /// Make `set_deleted` fail for one specific media id.
    pub fn fail_delete_of(&self, id: Uuid) {
        self.fail_delete_ids.lock().unwrap().insert(id);
    }

    /// Make every `retire` call fail.
    pub fn fail_retires(&self) {
        self.fail_retires.store(true, Ordering::SeqCst);
    }

    /// Make `list_with_media` fail.
    pub fn fail_listing(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }
}

fn store_error() -> Error {
    Error::Database(sqlx::Error::PoolClosed)
}

#[async_trait]
impl MediaRepository for MemoryStore {
    async fn list_hashed(&self) -> Result<Vec<Media>> {
        let media = self.media.lock().unwrap();
        Ok(media
            .values()
            .filter(|m| m.visual_hash.is_some() && !m.is_deleted)
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Media> {
        self.media
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(Error::MediaNotFound(id))
    }

    async fn set_deleted(&self, id: Uuid) -> Result<()> {
        if self.fail_delete_ids.lock().unwrap().contains(&id) {
            return Err(store_error());
        }
        let mut media = self.media.lock().unwrap();
        let record = media.get_mut(&id).ok_or(Error::MediaNotFound(id))?;
        record.is_deleted = true;
        record.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl DuplicatePairRepository for MemoryStore {
    async fn list_with_media(&self) -> Result<Vec<PairWithMedia>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(store_error());
        }
        let media = self.media.lock().unwrap();
        let pairs = self.pairs.lock().unwrap();
        let mut joined: Vec<PairWithMedia> = pairs
            .iter()
            .filter_map(|p| {
                let first = media.get(&p.media_id)?;
                let second = media.get(&p.duplicate_id)?;
                Some(PairWithMedia {
                    pair: p.clone(),
                    media: first.clone(),
                    duplicate: second.clone(),
                })
            })
            .collect();
        joined.sort_by_key(|pw| (pw.pair.media_id, pw.pair.duplicate_id));
        Ok(joined)
    }

    async fn retire(&self, media_id: Uuid, duplicate_id: Uuid) -> Result<()> {
        if self.fail_retires.load(Ordering::SeqCst) {
            return Err(store_error());
        }
        self.pairs.lock().unwrap().retain(|p| {
            !(p.media_id == media_id && p.duplicate_id == duplicate_id)
                && !(p.media_id == duplicate_id && p.duplicate_id == media_id)
        });
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.pairs.lock().unwrap().len() as i64)
    }
}

/// A media record with a deterministic id, hashed and undeleted.
pub fn sample_media(seq: u128, path: &str, size_bytes: i64) -> Media {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    Media {
        id: Uuid::from_u128(seq),
        path: path.to_string(),
        size_bytes,
        visual_hash: Some("d1c4f0a5e2b39876".to_string()),
        capture: CaptureMetadata::default(),
        is_deleted: false,
        is_hidden: false,
        created_at: now,
        updated_at: now,
    }
}
