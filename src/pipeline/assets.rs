use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Opaque reference to a published asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetHandle(u64);

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset:{}", self.0)
    }
}

/// Bytes behind a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub bytes: Arc<[u8]>,
    pub mime: &'static str,
}

/// MIME type for a download extension.
pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        _ => "application/octet-stream",
    }
}

/// In-memory registry of transient playback and download assets.
///
/// Nothing is ever reclaimed implicitly: whoever publishes a handle owns it
/// and must [`release`](AssetStore::release) it.
#[derive(Debug, Default)]
pub struct AssetStore {
    next_id: AtomicU64,
    assets: Mutex<HashMap<AssetHandle, Asset>>,
}

impl AssetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<AssetHandle, Asset>> {
        self.assets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `bytes` under a fresh handle.
    pub fn publish(&self, bytes: Vec<u8>, mime: &'static str) -> AssetHandle {
        let handle = AssetHandle(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        log::debug!("Publishing {handle} ({} bytes, {mime})", bytes.len());
        self.lock().insert(
            handle,
            Asset {
                bytes: bytes.into(),
                mime,
            },
        );
        handle
    }

    /// Bytes and MIME type behind `handle`, if still published.
    pub fn get(&self, handle: AssetHandle) -> Option<Asset> {
        self.lock().get(&handle).cloned()
    }

    /// Drop the asset behind `handle`. Returns `false` if it was already gone.
    pub fn release(&self, handle: AssetHandle) -> bool {
        let released = self.lock().remove(&handle).is_some();
        if released {
            log::debug!("Released {handle}");
        } else {
            log::warn!("Release of unknown {handle}");
        }
        released
    }

    /// Number of assets currently published.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }
}
