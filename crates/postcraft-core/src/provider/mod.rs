//! Generation client: the seam between the pipeline and the text provider.
//!
//! ```text
//! Orchestrator
//!     |
//!     v
//! Arc<dyn TextGenerator> --generate(instructions)--> raw text
//!     |                                   |
//!     |                                   +--> ProviderError (uninterpreted)
//!     v
//! GeminiClient (default backend, built once from GeminiConfig)
//! ```

pub mod config;
pub mod error;
pub mod gemini;
pub mod trait_def;

pub use config::{ConfigError, GeminiConfig};
pub use error::ProviderError;
pub use gemini::GeminiClient;
pub use trait_def::TextGenerator;
