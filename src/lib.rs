//! Text translation through the public `translate_a/single` endpoint family.
//!
//! The pipeline validates the requested languages, then tries three endpoint
//! strategies in order (signed, webapp, dict-chrome-ex) until one returns a
//! payload that parses into a [`TranslationResult`].

pub mod config;
pub mod error;
pub mod fallback;
pub mod languages;
pub mod payload;
pub mod response;
pub mod server;
pub mod strategy;
pub mod token;
pub mod translator;

pub use error::{MalformedResponse, SigningError, StrategyError, TranslateError};
pub use languages::Language;
pub use response::{DetectedSource, SourceSuggestion, TranslationResult};
pub use translator::{TranslateOptions, TranslationRequest, Translator};
