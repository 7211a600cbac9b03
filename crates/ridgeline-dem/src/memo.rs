//! Caller-owned memoization of generation and acquisition results.
//!
//! Entries are keyed on the producing function and its arguments. Nothing is
//! cached implicitly: the caller owns the [`ElevationMemo`], decides what goes
//! in, and invalidates entries when inputs change.

use crate::raster::BoundingBox;
use crate::remote::Provider;
use crate::synthetic::{GridArea, SyntheticTerrain};
use crate::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Default number of entries kept before the least recently used is evicted.
pub const DEFAULT_MEMO_CAPACITY: usize = 16;

/// Hashable form of a [`GridArea`] (floats compared bitwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AreaKey {
    center_lat: u64,
    center_lon: u64,
    grid_size: usize,
    extent: u64,
}

impl From<&GridArea> for AreaKey {
    fn from(area: &GridArea) -> Self {
        Self {
            center_lat: area.center_lat.to_bits(),
            center_lon: area.center_lon.to_bits(),
            grid_size: area.grid_size,
            extent: area.extent.to_bits(),
        }
    }
}

/// Hashable form of a [`BoundingBox`] (floats compared bitwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundsKey {
    min_lon: u64,
    min_lat: u64,
    max_lon: u64,
    max_lat: u64,
}

impl From<&BoundingBox> for BoundsKey {
    fn from(bbox: &BoundingBox) -> Self {
        Self {
            min_lon: bbox.min_lon.to_bits(),
            min_lat: bbox.min_lat.to_bits(),
            max_lon: bbox.max_lon.to_bits(),
            max_lat: bbox.max_lat.to_bits(),
        }
    }
}

/// Identity of a memoized call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemoKey {
    /// `SyntheticTerrain::generate*` over an area.
    Synthetic {
        area: AreaKey,
        /// Serialized terrain parameters.
        terrain: String,
        seed: Option<u64>,
    },
    /// Remote acquisition of an area's grid coordinates.
    Remote {
        area: AreaKey,
        provider: Provider,
        endpoint: String,
    },
    /// A file read, optionally windowed and resampled.
    File {
        path: PathBuf,
        bbox: Option<BoundsKey>,
        resample: Option<usize>,
    },
}

impl MemoKey {
    /// Key for synthetic generation.
    pub fn synthetic(terrain: &SyntheticTerrain, area: &GridArea, seed: Option<u64>) -> Result<Self> {
        Ok(MemoKey::Synthetic {
            area: area.into(),
            terrain: serde_json::to_string(terrain)?,
            seed,
        })
    }

    /// Key for remote acquisition.
    pub fn remote(area: &GridArea, provider: Provider, endpoint: impl Into<String>) -> Self {
        MemoKey::Remote {
            area: area.into(),
            provider,
            endpoint: endpoint.into(),
        }
    }

    /// Key for a file read.
    pub fn file(path: &Path, bbox: Option<&BoundingBox>, resample: Option<usize>) -> Self {
        MemoKey::File {
            path: path.to_path_buf(),
            bbox: bbox.map(BoundsKey::from),
            resample,
        }
    }
}

/// LRU map from [`MemoKey`] to a computed value.
#[derive(Debug)]
pub struct ElevationMemo<V> {
    entries: HashMap<MemoKey, V>,
    /// Access order for LRU eviction (most recently used at the back).
    access_order: Vec<MemoKey>,
    capacity: usize,
}

impl<V> Default for ElevationMemo<V> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MEMO_CAPACITY)
    }
}

impl<V> ElevationMemo<V> {
    /// Create an empty memo holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            access_order: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Look up a value and mark it as recently used.
    pub fn get(&mut self, key: &MemoKey) -> Option<&V> {
        if self.entries.contains_key(key) {
            self.touch(key);
        }
        self.entries.get(key)
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// A failing `compute` leaves the memo unchanged.
    pub fn get_or_insert_with<F>(&mut self, key: MemoKey, compute: F) -> Result<&V>
    where
        F: FnOnce() -> Result<V>,
    {
        if self.entries.contains_key(&key) {
            trace!(?key, "Memo hit");
            self.touch(&key);
        } else {
            trace!(?key, "Memo miss");
            let value = compute()?;
            self.insert(key.clone(), value);
        }
        self.entries
            .get(&key)
            .ok_or_else(|| crate::DemError::invalid("memo", "capacity", "entry evicted on insert"))
    }

    /// Store a value, evicting the least recently used entries when full.
    pub fn insert(&mut self, key: MemoKey, value: V) {
        if self.entries.contains_key(&key) {
            self.touch(&key);
            self.entries.insert(key, value);
            return;
        }

        while self.entries.len() >= self.capacity && !self.access_order.is_empty() {
            let oldest = self.access_order.remove(0);
            self.entries.remove(&oldest);
        }

        self.access_order.push(key.clone());
        self.entries.insert(key, value);
    }

    /// Drop one entry, returning it if present.
    pub fn invalidate(&mut self, key: &MemoKey) -> Option<V> {
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            self.access_order.remove(pos);
        }
        self.entries.remove(key)
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.access_order.clear();
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the memo holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mark a key as recently used (move to back of access order).
    fn touch(&mut self, key: &MemoKey) {
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            let k = self.access_order.remove(pos);
            self.access_order.push(k);
        }
    }
}
