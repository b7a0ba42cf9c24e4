//! Configuration loading for the RAG service.
//!
//! Layered config, later sources win:
//! defaults -> ~/.config/rag-chroma/config.toml -> explicit file -> RAG__* env vars -> CLI flags
//!
//! The explicit file comes from `--config` or, failing that, the `CONFIG_PATH`
//! environment variable (container deployments mount the file there).

use config::{Config, Environment, File};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::RagError;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Embedding backend selector (`embedder.type`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum EmbedderKind {
    /// OpenAI-compatible endpoint (OpenRouter, Ollama, LM Studio, ...)
    #[default]
    #[serde(rename = "generic")]
    Generic,
    /// Azure OpenAI deployment
    #[serde(rename = "azure-openai")]
    AzureOpenAi,
    /// Local sentence-transformer model run in-process
    #[serde(rename = "sentence-transformer")]
    SentenceTransformer,
}

impl EmbedderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedderKind::Generic => "generic",
            EmbedderKind::AzureOpenAi => "azure-openai",
            EmbedderKind::SentenceTransformer => "sentence-transformer",
        }
    }
}

/// Backend selection and transport options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedderSettings {
    /// Which backend to build
    #[serde(rename = "type", default)]
    pub kind: EmbedderKind,

    /// Per-request timeout for remote backends, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for EmbedderSettings {
    fn default() -> Self {
        Self {
            kind: EmbedderKind::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// `[generic]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenericSettings {
    /// API key (optional for local servers such as Ollama)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Embeddings endpoint, e.g. https://openrouter.ai/api/v1/embeddings
    /// or http://localhost:11434/api/embeddings
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Embedding model name
    #[serde(default)]
    pub model: Option<String>,
}

/// `[azure_openai]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureOpenAiSettings {
    #[serde(default)]
    pub api_key: Option<String>,

    /// Resource endpoint, e.g. https://my-resource.openai.azure.com
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub deployment_name: Option<String>,

    #[serde(default = "default_azure_api_version")]
    pub api_version: String,
}

fn default_azure_api_version() -> String {
    "2024-02-01".to_string()
}

impl Default for AzureOpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: None,
            deployment_name: None,
            api_version: default_azure_api_version(),
        }
    }
}

/// `[sentence_transformer]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceTransformerSettings {
    /// HuggingFace model id; bare names resolve under `sentence-transformers/`
    #[serde(default = "default_local_model")]
    pub model_name: String,

    /// Where downloaded model files are kept
    #[serde(default)]
    pub cache_dir: Option<String>,
}

fn default_local_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}

impl Default for SentenceTransformerSettings {
    fn default() -> Self {
        Self {
            model_name: default_local_model(),
            cache_dir: None,
        }
    }
}

/// `[store]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Directory holding the document records and the vector index
    #[serde(default = "default_persist_directory")]
    pub persist_directory: String,

    /// HNSW graph degree (`M`)
    #[serde(default = "default_index_connectivity")]
    pub index_connectivity: usize,

    /// Candidate list size while inserting (`ef_construction`)
    #[serde(default = "default_index_expansion_add")]
    pub index_expansion_add: usize,

    /// Candidate list size while searching (`ef_search`)
    #[serde(default = "default_index_expansion_search")]
    pub index_expansion_search: usize,
}

fn default_index_connectivity() -> usize {
    16
}

fn default_index_expansion_add() -> usize {
    200
}

fn default_index_expansion_search() -> usize {
    100
}

fn default_persist_directory() -> String {
    ProjectDirs::from("", "", "rag-chroma")
        .map(|p| p.data_local_dir().join("chroma"))
        .unwrap_or_else(|| PathBuf::from("./chroma_db"))
        .to_string_lossy()
        .to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            persist_directory: default_persist_directory(),
            index_connectivity: default_index_connectivity(),
            index_expansion_add: default_index_expansion_add(),
            index_expansion_search: default_index_expansion_search(),
        }
    }
}

impl StoreSettings {
    /// Persist directory with a leading `~/` expanded to the home directory
    pub fn expanded_persist_directory(&self) -> PathBuf {
        expand_home(&self.persist_directory)
    }
}

/// `[server]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty means any origin
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl ServerSettings {
    /// Socket address string for the HTTP listener
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub embedder: EmbedderSettings,

    #[serde(default)]
    pub generic: GenericSettings,

    #[serde(default)]
    pub azure_openai: AzureOpenAiSettings,

    #[serde(default)]
    pub sentence_transformer: SentenceTransformerSettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            store: StoreSettings::default(),
            server: ServerSettings::default(),
            embedder: EmbedderSettings::default(),
            generic: GenericSettings::default(),
            azure_openai: AzureOpenAiSettings::default(),
            sentence_transformer: SentenceTransformerSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/rag-chroma/config.toml)
    /// 3. Explicit config file (`cli_config_path`, else `CONFIG_PATH`)
    /// 4. Environment variables (RAG__SECTION__KEY)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, RagError> {
        let config_dir = ProjectDirs::from("", "", "rag-chroma")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(|e| RagError::Config(e.to_string()))?
            .set_default("store.persist_directory", default_persist_directory())
            .map_err(|e| RagError::Config(e.to_string()))?
            .set_default("server.host", default_host())
            .map_err(|e| RagError::Config(e.to_string()))?
            .set_default("server.port", default_port() as i64)
            .map_err(|e| RagError::Config(e.to_string()))?
            .set_default("embedder.type", EmbedderKind::default().as_str())
            .map_err(|e| RagError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        let explicit = cli_config_path
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.is_empty()));
        if let Some(path) = explicit {
            builder = builder.add_source(File::with_name(&path).required(true));
        }

        // RAG__SERVER__PORT, RAG__EMBEDDER__TYPE, RAG__GENERIC__API_KEY, ...
        builder = builder.add_source(
            Environment::with_prefix("RAG")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| RagError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| RagError::Config(e.to_string()))
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}
