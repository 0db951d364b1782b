//! Encoding cache for incremental builds.
//!
//! AVIF encoding is the slow part of a site build: the hero backdrop alone
//! at four widths takes several seconds through rav1e. This module lets the
//! process stage skip an encode when neither the source picture nor the
//! encoding parameters changed since the last build.
//!
//! # Design
//!
//! Only the encode is cached. Dimension reads always run, so a replaced
//! picture with the same name is always noticed through its hash.
//!
//! ## Cache keys
//!
//! Lookups are **content-addressed** by `source_hash` and `params_hash`, not
//! by output path. Moving `images/lobby.jpg` to `gallery/010-Lobby.jpg`
//! therefore costs a file copy, not an encode.
//!
//! - **`source_hash`**: SHA-256 of the source file contents. Content-based
//!   rather than mtime-based so it survives `git checkout`. Computed once
//!   per source and shared by all of its variants.
//! - **`params_hash`**: SHA-256 of (width, height, quality). Changing
//!   `images.sizes` or `images.quality` re-encodes exactly the affected
//!   variants.
//!
//! A hit requires a matching entry **and** the output file still on disk.
//!
//! ## Storage
//!
//! `<processed_dir>/.cache-manifest.json`, next to the variants it
//! describes, so caching the temp directory in CI caches both together.
//!
//! ## Bypassing the cache
//!
//! `--no-cache` on `process` or `build` starts from an empty manifest, so
//! every variant is encoded. The fresh manifest is still saved.

use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache manifest file within the processed directory.
const MANIFEST_FILENAME: &str = ".cache-manifest.json";

/// Version of the cache manifest format. Bump this to invalidate all
/// existing caches when the format or key computation changes.
const MANIFEST_VERSION: u32 = 2;

/// A single cached output file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
}

/// Outcome of a cache lookup for one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Output already at the expected path.
    Hit,
    /// Same content encoded earlier under another path.
    Moved(String),
    Miss,
}

/// On-disk cache manifest mapping output paths to their cache entries.
///
/// Lookups go through a runtime `content_index` that maps
/// `"{source_hash}:{params_hash}"` to the stored output path.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
    /// Built at load time, maintained on insert. Never serialized.
    #[serde(skip)]
    content_index: HashMap<String, String>,
}

fn content_key(source_hash: &str, params_hash: &str) -> String {
    format!("{}:{}", source_hash, params_hash)
}

impl CacheManifest {
    /// Create an empty manifest (used for `--no-cache` or first build).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
            content_index: HashMap::new(),
        }
    }

    /// Load from the processed directory. Missing, corrupt or outdated
    /// manifests load as empty.
    pub fn load(output_dir: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(manifest_path(output_dir)) else {
            return Self::empty();
        };
        let Ok(mut manifest) = serde_json::from_str::<Self>(&content) else {
            return Self::empty();
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest.content_index = manifest
            .entries
            .iter()
            .map(|(path, e)| (content_key(&e.source_hash, &e.params_hash), path.clone()))
            .collect();
        manifest
    }

    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(output_dir), json)
    }

    /// Stored output path for this content, if the file is still on disk.
    pub fn find_cached(
        &self,
        source_hash: &str,
        params_hash: &str,
        output_dir: &Path,
    ) -> Option<String> {
        let stored = self
            .content_index
            .get(&content_key(source_hash, params_hash))?;
        output_dir.join(stored).exists().then(|| stored.clone())
    }

    /// Classify a variant about to be written to `expected_path`.
    pub fn lookup(
        &self,
        source_hash: &str,
        params_hash: &str,
        expected_path: &str,
        output_dir: &Path,
    ) -> Lookup {
        match self.find_cached(source_hash, params_hash, output_dir) {
            Some(stored) if stored == expected_path => Lookup::Hit,
            Some(stored) => Lookup::Moved(stored),
            None => Lookup::Miss,
        }
    }

    /// Record an output file. An older entry with the same content under
    /// another path is dropped.
    pub fn insert(&mut self, output_path: String, source_hash: String, params_hash: String) {
        let key = content_key(&source_hash, &params_hash);

        if let Some(old_path) = self.content_index.get(&key)
            && *old_path != output_path
        {
            self.entries.remove(old_path.as_str());
        }

        self.content_index.insert(key, output_path.clone());
        self.entries.insert(
            output_path,
            CacheEntry {
                source_hash,
                params_hash,
            },
        );
    }

    /// Forget every output not produced by the current build.
    pub fn retain_outputs(&mut self, produced: &HashSet<String>) {
        self.entries.retain(|path, _| produced.contains(path));
        self.content_index.retain(|_, path| produced.contains(path));
    }
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// SHA-256 hash of the encoding parameters of one AVIF variant.
pub fn hash_variant_params(width: u32, height: u32, quality: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"avif\0");
    hasher.update(width.to_le_bytes());
    hasher.update(height.to_le_bytes());
    hasher.update(quality.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub copies: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn copy(&mut self) {
        self.copies += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.copies + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits == 0 && self.copies == 0 {
            return write!(f, "{} encoded", self.misses);
        }
        write!(f, "{} cached, ", self.hits)?;
        if self.copies > 0 {
            write!(f, "{} copied, ", self.copies)?;
        }
        write!(f, "{} encoded ({} total)", self.misses, self.total())
    }
}

/// Resolve the cache manifest path for a processed directory.
pub fn manifest_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MANIFEST_FILENAME)
}
