//! Social post generation pipeline.
//!
//! ```text
//! GenerationRequest
//!     |
//!     v
//! orchestrator --for each platform--> platform::profile
//!     |                                   |
//!     |                                   v
//!     |                               prompt::compile
//!     |                                   |
//!     |                                   v
//!     |                   provider::TextGenerator::generate --err--> classify
//!     |                                   |
//!     |                                   v
//!     |                               enforce::enforce
//!     |                                   |
//!     v                                   v
//! posts / report  <----------------  postcraft_db insert
//! ```

pub mod classify;
pub mod enforce;
pub mod orchestrator;
pub mod platform;
pub mod probe;
pub mod prompt;
pub mod provider;
