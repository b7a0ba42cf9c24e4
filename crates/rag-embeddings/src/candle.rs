//! Local sentence-transformer backend using Candle.
//!
//! [`CandleEmbedder`] is the synchronous BERT encoder (mean pooling, unit
//! length output). [`SentenceTransformerEmbedder`] wraps it as an
//! [`EmbeddingProvider`], loading the model on first use and running
//! inference on the blocking thread pool.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use serde::Deserialize;
use tokenizers::Tokenizer;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::cache::{get_or_download_model, ModelCache};
use crate::error::EmbeddingError;
use crate::model::{ensure_count, Embedding, EmbeddingProvider};

/// Upper bound on tokens per text; longer inputs are truncated
pub const MAX_SEQ_LENGTH: usize = 256;

/// Fields of config.json needed beyond what BertConfig exposes
#[derive(Deserialize)]
struct ModelShape {
    hidden_size: usize,
}

/// Loaded BERT sentence encoder.
pub struct CandleEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimension: usize,
}

impl CandleEmbedder {
    /// Load the model from cache, downloading it first if needed.
    pub fn load(cache: &ModelCache) -> Result<Self, EmbeddingError> {
        let paths = get_or_download_model(cache)?;
        Self::load_from_paths(&paths.config, &paths.tokenizer, &paths.weights)
    }

    pub fn load_from_paths(
        config_path: &Path,
        tokenizer_path: &Path,
        weights_path: &Path,
    ) -> Result<Self, EmbeddingError> {
        info!(config = ?config_path, "Loading sentence-transformer model");

        // CPU only
        let device = Device::Cpu;

        let config_str = std::fs::read_to_string(config_path)?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|e| EmbeddingError::ModelNotFound(format!("Invalid config: {}", e)))?;
        let shape: ModelShape = serde_json::from_str(&config_str)
            .map_err(|e| EmbeddingError::ModelNotFound(format!("Invalid config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.to_path_buf()], DType::F32, &device)?
        };
        let model = BertModel::load(vb, &config)?;

        info!(dim = shape.hidden_size, "Model loaded");

        Ok(Self {
            model,
            tokenizer,
            device,
            dimension: shape.hidden_size,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Encode a batch of texts into unit-length vectors.
    pub fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(MAX_SEQ_LENGTH);

        let mut ids_flat = Vec::with_capacity(texts.len() * seq_len);
        let mut mask_flat = Vec::with_capacity(texts.len() * seq_len);
        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let take = ids.len().min(seq_len);

            ids_flat.extend_from_slice(&ids[..take]);
            ids_flat.extend(std::iter::repeat(0).take(seq_len - take));
            mask_flat.extend_from_slice(&mask[..take]);
            mask_flat.extend(std::iter::repeat(0).take(seq_len - take));
        }

        let batch = texts.len();
        let input_ids = Tensor::from_vec(ids_flat, (batch, seq_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask_flat, (batch, seq_len), &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = mean_pool(&hidden, &attention_mask)?;

        let rows: Vec<Vec<f32>> = pooled.to_vec2()?;
        ensure_count(batch, rows.len())?;
        debug!(count = batch, dim = self.dimension, "Encoded batch");

        Ok(rows.into_iter().map(Embedding::normalized).collect())
    }
}

/// Average token vectors, ignoring padding positions.
fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor, EmbeddingError> {
    let mask = attention_mask
        .unsqueeze(2)?
        .broadcast_as(hidden.shape())?
        .to_dtype(DType::F32)?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    // at least one token per row, guards empty rows
    let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;
    Ok(summed.broadcast_div(&counts)?)
}

/// `sentence-transformer` provider: in-process model, no network after the
/// first download.
pub struct SentenceTransformerEmbedder {
    cache: ModelCache,
    model: OnceCell<Arc<CandleEmbedder>>,
}

impl SentenceTransformerEmbedder {
    /// Create the provider. Nothing is loaded until the first `embed` call.
    pub fn new(cache: ModelCache) -> Self {
        Self {
            cache,
            model: OnceCell::new(),
        }
    }

    pub fn repo_id(&self) -> &str {
        &self.cache.repo_id
    }

    async fn model(&self) -> Result<Arc<CandleEmbedder>, EmbeddingError> {
        let model = self
            .model
            .get_or_try_init(|| async {
                let cache = self.cache.clone();
                let loaded = tokio::task::spawn_blocking(move || CandleEmbedder::load(&cache))
                    .await
                    .map_err(|e| {
                        EmbeddingError::ModelNotFound(format!("model load task failed: {}", e))
                    })??;
                Ok::<_, EmbeddingError>(Arc::new(loaded))
            })
            .await?;
        Ok(Arc::clone(model))
    }
}

#[async_trait]
impl EmbeddingProvider for SentenceTransformerEmbedder {
    fn name(&self) -> &str {
        "sentence-transformer"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let model = self.model().await?;
        let owned = texts.to_vec();
        tokio::task::spawn_blocking(move || {
            let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
            model.encode(&refs)
        })
        .await
        .map_err(|e| EmbeddingError::Tokenizer(format!("encode task failed: {}", e)))?
    }
}
