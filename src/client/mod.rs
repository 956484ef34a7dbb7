//! # Generative API Client Foundation
//!
//! The outward-facing half of the insights core: a trait seam over the
//! external completion API, the production Gemini implementation, and the
//! defensive JSON extraction applied to model replies.
//!
//! ## Architecture
//!
//! - **GenerativeClient**: text-in/text-out trait the resilience pipeline
//!   calls through; the injection point for tests
//! - **GeminiClient**: reqwest-based `generateContent` client, credential
//!   supplied via configuration
//! - **extract**: first-balanced-JSON scan over free model text

pub mod extract;
pub mod generative;
pub mod gemini;

pub use extract::extract_json;
pub use generative::GenerativeClient;
pub use gemini::{GeminiClient, GeminiConfig};
