//! Endpoint strategies: the three ways of reaching `translate_a/single`.
//!
//! All strategies send the same query schema; they differ in host, `client`
//! identifier, and extras (signed `tk` token, `Referer` header).

use crate::config::Config;
use crate::error::StrategyError;
use crate::response::{parse_response, TranslationResult};
use crate::token::{SignedToken, TokenSigner};
use crate::translator::TranslationRequest;
use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::debug;

/// Response sections requested through repeated `dt` parameters.
pub const RESPONSE_SECTIONS: &[&str] = &["t", "bd", "ex", "ld", "md", "qca", "rw", "rm", "ss", "t"];

/// One way of contacting the translation service.
///
/// Implementations are stateless and shared between concurrent calls.
pub trait Strategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn execute<'a>(
        &'a self,
        request: &'a TranslationRequest,
    ) -> BoxFuture<'a, Result<TranslationResult, StrategyError>>;
}

/// A strategy backed by an HTTP GET against one endpoint variant.
#[derive(Debug, Clone)]
pub struct HttpStrategy {
    name: &'static str,
    client: reqwest::Client,
    endpoint_url: String,
    client_id: &'static str,
    user_agent: String,
    referer: Option<String>,
    signer: Option<TokenSigner>,
}

impl HttpStrategy {
    /// Primary: `client=gtx`, signed with a `tk` token.
    pub fn signed(client: reqwest::Client, config: &Config) -> Self {
        let signer = TokenSigner::new(
            client.clone(),
            config.token_seed_url.clone(),
            config.user_agent.clone(),
        );

        Self {
            name: "signed",
            client,
            endpoint_url: config.signed_endpoint_url.clone(),
            client_id: "gtx",
            user_agent: config.user_agent.clone(),
            referer: None,
            signer: Some(signer),
        }
    }

    /// Browser-client fallback: `client=webapp` with a `Referer` header.
    pub fn webapp(client: reqwest::Client, config: &Config) -> Self {
        Self {
            name: "webapp",
            client,
            endpoint_url: config.webapp_endpoint_url.clone(),
            client_id: "webapp",
            user_agent: config.user_agent.clone(),
            referer: Some(config.webapp_referer.clone()),
            signer: None,
        }
    }

    /// Secondary fallback: `client=dict-chrome-ex` on a different host.
    pub fn dict_chrome_ex(client: reqwest::Client, config: &Config) -> Self {
        Self {
            name: "dict-chrome-ex",
            client,
            endpoint_url: config.fallback_endpoint_url.clone(),
            client_id: "dict-chrome-ex",
            user_agent: config.user_agent.clone(),
            referer: None,
            signer: None,
        }
    }

    /// Query parameters shared by every strategy, plus the signature if any.
    fn query_params(
        &self,
        request: &TranslationRequest,
        token: Option<&SignedToken>,
    ) -> Vec<(String, String)> {
        let mut params = vec![
            ("client".to_string(), self.client_id.to_string()),
            ("sl".to_string(), request.source.code().to_string()),
            ("tl".to_string(), request.target.code().to_string()),
            ("hl".to_string(), request.target.code().to_string()),
        ];
        params.extend(
            RESPONSE_SECTIONS
                .iter()
                .map(|section| ("dt".to_string(), section.to_string())),
        );
        params.extend(
            [
                ("ie", "UTF-8"),
                ("oe", "UTF-8"),
                ("otf", "1"),
                ("ssel", "0"),
                ("tsel", "0"),
                ("kc", "7"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        params.push(("q".to_string(), request.text.clone()));

        if let Some(token) = token {
            params.push((token.param_name.clone(), token.param_value.clone()));
        }

        params
    }

    async fn run(&self, request: &TranslationRequest) -> Result<TranslationResult, StrategyError> {
        let token = match &self.signer {
            Some(signer) => Some(signer.sign(&request.text).await?),
            None => None,
        };

        let params = self.query_params(request, token.as_ref());
        debug!(
            "{}: GET {} (client={}, sl={}, tl={})",
            self.name, self.endpoint_url, self.client_id, request.source, request.target
        );

        let mut builder = self
            .client
            .get(&self.endpoint_url)
            .query(&params)
            .header("User-Agent", &self.user_agent);
        if let Some(referer) = &self.referer {
            builder = builder.header("Referer", referer);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(StrategyError::Status { status, body });
        }

        let body = response.text().await?;
        Ok(parse_response(&body, request.raw)?)
    }
}

impl Strategy for HttpStrategy {
    fn name(&self) -> &str {
        self.name
    }

    fn execute<'a>(
        &'a self,
        request: &'a TranslationRequest,
    ) -> BoxFuture<'a, Result<TranslationResult, StrategyError>> {
        self.run(request).boxed()
    }
}

/// The built-in strategies in fallback order: signed, webapp, dict-chrome-ex.
pub fn default_strategies(client: reqwest::Client, config: &Config) -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(HttpStrategy::signed(client.clone(), config)),
        Box::new(HttpStrategy::webapp(client.clone(), config)),
        Box::new(HttpStrategy::dict_chrome_ex(client, config)),
    ]
}
