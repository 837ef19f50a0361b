//! Default values for Lexicon configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Taxonomy Defaults
// ============================================================================

/// Label of the designated root term.
pub const ROOT_LABEL: &str = "KNOWLEDGE";

// ============================================================================
// Remote Defaults
// ============================================================================

/// Base URL of the remote taxonomy service.
pub const DEFAULT_REMOTE_URL: &str = "http://localhost:3334";

/// Path of the full-graph endpoint.
pub const DEFAULT_GRAPH_PATH: &str = "/api/lexicon/graph";

/// Path of the navigation-assist endpoint.
pub const DEFAULT_NAVIGATE_PATH: &str = "/api/lexicon/navigate";

/// Path of the term mutation endpoint.
pub const DEFAULT_TERMS_PATH: &str = "/api/lexicon/terms";

// ============================================================================
// Cache Defaults
// ============================================================================

/// Directory holding the local snapshot.
pub const DEFAULT_DATA_DIR: &str = ".lexicon";

/// Fixed key of the persisted graph snapshot slot.
pub const DEFAULT_SNAPSHOT_KEY: &str = "lexicon-graph-v1";

// ============================================================================
// Navigation Defaults
// ============================================================================

/// Horizontal centering for a sibling move (ms).
pub const DEFAULT_SIBLING_SCROLL_MS: u64 = 260;

/// Horizontal centering of the clicked term before a parent/child move (ms).
pub const DEFAULT_FOCUS_SCROLL_MS: u64 = 360;

/// Vertical slide between the old and new content blocks (ms).
pub const DEFAULT_SLIDE_MS: u64 = 320;

/// Interval between animation frames (ms), roughly 60 fps.
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

// ============================================================================
// Server Defaults
// ============================================================================

/// Port the reference server listens on.
pub const DEFAULT_SERVER_PORT: u16 = 3334;

/// Host the reference server binds to.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Catalog document used by the reference server.
pub const DEFAULT_CATALOG_FILE: &str = ".lexicon/catalog.json";

/// `max-age` sent with the full-graph response (seconds).
pub const DEFAULT_GRAPH_MAX_AGE_SECS: u64 = 60;

// ============================================================================
// LLM Defaults
// ============================================================================

/// Default LLM provider.
pub const DEFAULT_LLM_PROVIDER: &str = "openai";

/// Default OpenAI-compatible base URL.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default OpenAI model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Default Anthropic messages endpoint.
pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

/// Default Anthropic model.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";

/// Anthropic API version header value.
pub const DEFAULT_ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Default Ollama base URL (OpenAI-compatible).
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/v1";

/// Default Ollama model.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

/// Classification answers are a single label.
pub const DEFAULT_MAX_TOKENS: u32 = 64;
