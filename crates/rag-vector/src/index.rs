//! HNSW index over document embeddings, backed by usearch.
//!
//! Distances are squared Euclidean (`MetricKind::L2sq`), the same quantity
//! Chroma reports for its default `l2` space. Keys are the store's internal
//! u64 record keys.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use crate::error::VectorError;

/// Index file name inside the index directory
pub const INDEX_FILE: &str = "vectors.usearch";

/// HNSW tuning parameters
#[derive(Debug, Clone)]
pub struct HnswConfig {
    /// Connections per layer (M)
    pub connectivity: usize,
    /// Build-time search depth (ef_construction)
    pub expansion_add: usize,
    /// Query-time search depth (ef_search)
    pub expansion_search: usize,
    /// Slots reserved when an index is created
    pub initial_capacity: usize,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            connectivity: 16,
            expansion_add: 200,
            expansion_search: 100,
            initial_capacity: 1_024,
        }
    }
}

impl HnswConfig {
    pub fn with_connectivity(mut self, m: usize) -> Self {
        self.connectivity = m;
        self
    }

    pub fn with_expansion(mut self, ef_add: usize, ef_search: usize) -> Self {
        self.expansion_add = ef_add;
        self.expansion_search = ef_search;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    fn options(&self, dimension: usize) -> IndexOptions {
        IndexOptions {
            dimensions: dimension,
            metric: MetricKind::L2sq,
            quantization: ScalarKind::F32,
            connectivity: self.connectivity,
            expansion_add: self.expansion_add,
            expansion_search: self.expansion_search,
            multi: false,
        }
    }
}

fn path_str(path: &Path) -> Result<&str, VectorError> {
    path.to_str()
        .ok_or_else(|| VectorError::Index("Invalid path encoding".to_string()))
}

/// usearch index of fixed dimension stored in one file.
pub struct L2Index {
    index: Index,
    dimension: usize,
    file: PathBuf,
}

impl L2Index {
    /// Create an empty index that will be saved to `dir/vectors.usearch`.
    pub fn create(dir: &Path, dimension: usize, config: &HnswConfig) -> Result<Self, VectorError> {
        std::fs::create_dir_all(dir)?;
        let index =
            Index::new(&config.options(dimension)).map_err(|e| VectorError::Index(e.to_string()))?;
        index
            .reserve(config.initial_capacity.max(1))
            .map_err(|e| VectorError::Index(e.to_string()))?;

        info!(path = ?dir, dim = dimension, "Created vector index");
        Ok(Self {
            index,
            dimension,
            file: dir.join(INDEX_FILE),
        })
    }

    /// Load `dir/vectors.usearch`. Fails if the file is missing or unreadable.
    pub fn load(dir: &Path, dimension: usize, config: &HnswConfig) -> Result<Self, VectorError> {
        let file = dir.join(INDEX_FILE);
        if !file.exists() {
            return Err(VectorError::Index(format!("Index file missing: {:?}", file)));
        }

        let index =
            Index::new(&config.options(dimension)).map_err(|e| VectorError::Index(e.to_string()))?;
        index
            .load(path_str(&file)?)
            .map_err(|e| VectorError::Index(format!("Failed to load: {}", e)))?;

        if index.dimensions() != dimension {
            return Err(VectorError::DimensionMismatch {
                expected: dimension,
                actual: index.dimensions(),
            });
        }

        info!(path = ?file, vectors = index.size(), "Opened vector index");
        Ok(Self {
            index,
            dimension,
            file,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.index.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: u64) -> bool {
        self.index.contains(key)
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), VectorError> {
        if vector.len() != self.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Insert a vector under `key`, growing capacity as needed.
    pub fn add(&self, key: u64, vector: &[f32]) -> Result<(), VectorError> {
        self.check_dimension(vector)?;

        let needed = self.index.size() + 1;
        if needed > self.index.capacity() {
            self.index
                .reserve((needed * 2).max(16))
                .map_err(|e| VectorError::Index(e.to_string()))?;
        }

        self.index
            .add(key, vector)
            .map_err(|e| VectorError::Index(e.to_string()))?;
        debug!(key = key, "Added vector");
        Ok(())
    }

    /// Remove `key`; returns false when it was not indexed.
    pub fn remove(&self, key: u64) -> Result<bool, VectorError> {
        let removed = self
            .index
            .remove(key)
            .map_err(|e| VectorError::Index(e.to_string()))?;
        Ok(removed > 0)
    }

    /// Up to `k` nearest keys with their squared L2 distance, nearest first.
    pub fn search(&self, vector: &[f32], k: usize) -> Result<Vec<(u64, f32)>, VectorError> {
        self.check_dimension(vector)?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let matches = self
            .index
            .search(vector, k)
            .map_err(|e| VectorError::Index(e.to_string()))?;

        let mut hits: Vec<(u64, f32)> = matches
            .keys
            .iter()
            .copied()
            .zip(matches.distances.iter().copied())
            .collect();
        // stable: equal distances keep index order
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(hits)
    }

    pub fn save(&self) -> Result<(), VectorError> {
        self.index
            .save(path_str(&self.file)?)
            .map_err(|e| VectorError::Index(format!("Failed to save: {}", e)))?;
        debug!(path = ?self.file, vectors = self.index.size(), "Saved vector index");
        Ok(())
    }
}
