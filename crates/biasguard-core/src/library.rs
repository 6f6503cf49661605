//! Cached access to the active term library.
//!
//! One slot holds the compiled library for a TTL window. The slot is filled
//! lazily on the first read after it is empty or expired, and emptied by
//! [`TermLibrary::invalidate`], which every code path that creates, edits, or
//! deactivates a term must call. A failing store on a miss is an error; there is
//! no empty-library fallback.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::DetectError;
use crate::matcher::CompiledTerm;
use crate::store::TermStore;

struct CachedTerms {
    terms: Arc<[CompiledTerm]>,
    loaded_at: Instant,
}

pub struct TermLibrary {
    store: Arc<dyn TermStore>,
    ttl: Duration,
    slot: RwLock<Option<CachedTerms>>,
}

impl TermLibrary {
    pub fn new(store: Arc<dyn TermStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Active terms in library order, with compiled patterns.
    ///
    /// The returned snapshot stays valid even if the cache is invalidated
    /// while the caller is using it.
    pub fn get_active_terms(&self) -> Result<Arc<[CompiledTerm]>, DetectError> {
        {
            let slot = self.read_slot();
            if let Some(cached) = slot.as_ref()
                && cached.loaded_at.elapsed() < self.ttl
            {
                return Ok(Arc::clone(&cached.terms));
            }
        }

        let mut slot = self.write_slot();
        // Another reader may have reloaded while we waited for the write lock.
        if let Some(cached) = slot.as_ref()
            && cached.loaded_at.elapsed() < self.ttl
        {
            return Ok(Arc::clone(&cached.terms));
        }

        let terms: Arc<[CompiledTerm]> = self
            .store
            .list_active_terms()
            .map_err(DetectError::TermStore)?
            .into_iter()
            .filter(|t| t.is_active)
            .map(CompiledTerm::compile)
            .collect();

        let invalid = terms.iter().filter(|t| !t.is_valid()).count();
        info!(count = terms.len(), invalid, "loaded bias term library");

        *slot = Some(CachedTerms {
            terms: Arc::clone(&terms),
            loaded_at: Instant::now(),
        });
        Ok(terms)
    }

    /// Drop the cached library so the next read reloads from the store.
    pub fn invalidate(&self) {
        *self.write_slot() = None;
        debug!("bias term cache invalidated");
    }

    fn read_slot(&self) -> RwLockReadGuard<'_, Option<CachedTerms>> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// The slot is only replaced whole after a successful load, so a poisoned
    /// lock still holds a consistent value.
    fn write_slot(&self) -> RwLockWriteGuard<'_, Option<CachedTerms>> {
        let slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        self.slot.clear_poison();
        slot
    }
}
