//! Translation orchestrator: validation, defaults and ordered strategy fallback.

use crate::config::Config;
use crate::error::TranslateError;
use crate::fallback::{with_fallback, Exhausted};
use crate::languages::{self, Language};
use crate::response::TranslationResult;
use crate::strategy::{default_strategies, Strategy};
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Caller-facing options. Unset languages default to `auto` → `en`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslateOptions {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub raw: bool,
}

impl TranslateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lang(mut self, language: impl Into<String>) -> Self {
        self.from = Some(language.into());
        self
    }

    pub fn to_lang(mut self, language: impl Into<String>) -> Self {
        self.to = Some(language.into());
        self
    }

    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }
}

/// A validated request as handed to each strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub source: Language,
    pub target: Language,
    /// Attach the untouched response body to the result
    pub raw: bool,
}

impl TranslationRequest {
    /// Validate options against the registry and apply defaults.
    ///
    /// Both languages are checked before anything is rejected; when both are
    /// unsupported the `from` identifier is reported.
    pub fn new(text: &str, options: &TranslateOptions) -> Result<Self, TranslateError> {
        if text.trim().is_empty() {
            return Err(TranslateError::EmptyText);
        }

        // Blank identifiers count as unset
        let source = given(&options.from).map(Language::from_identifier);
        let target = given(&options.to).map(Language::from_identifier);

        let source = source.transpose()?.unwrap_or(Language::AUTO);
        let target = target.transpose()?.unwrap_or(Language::ENGLISH);

        Ok(Self {
            text: text.to_string(),
            source,
            target,
            raw: options.raw,
        })
    }
}

fn given(identifier: &Option<String>) -> Option<&str> {
    identifier.as_deref().filter(|s| !s.trim().is_empty())
}

/// Runs translate calls through an ordered list of strategies.
///
/// Immutable after construction; share it behind an `Arc`.
pub struct Translator {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Translator {
    /// Build the default signed → webapp → dict-chrome-ex chain.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_strategies(default_strategies(client, config)))
    }

    /// Use a custom strategy chain, tried in the given order.
    ///
    /// # Panics
    /// Panics if `strategies` is empty
    pub fn with_strategies(strategies: Vec<Box<dyn Strategy>>) -> Self {
        assert!(!strategies.is_empty(), "Translator needs at least one strategy");
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Supported languages as `{ code: display name }`, including `auto`.
    pub fn languages() -> BTreeMap<&'static str, &'static str> {
        languages::list()
    }

    /// Translate `text`, falling back through every strategy once.
    pub async fn translate(
        &self,
        text: &str,
        options: TranslateOptions,
    ) -> Result<TranslationResult, TranslateError> {
        let request = TranslationRequest::new(text, &options)?;
        let source = if request.source.is_auto() {
            "detected language"
        } else {
            request.source.name()
        };
        debug!(
            "Translating {} chars from {} to {}",
            request.text.chars().count(),
            source,
            request.target.name()
        );

        with_fallback(
            self.strategies.as_slice(),
            "Translation",
            |strategy| strategy.name(),
            |strategy| strategy.execute(&request),
        )
        .await
        .map_err(|Exhausted { attempts, last_error }| TranslateError::AllStrategiesFailed {
            attempts,
            source: last_error,
        })
    }
}
