//! Request signing for the `gtx` endpoint.
//!
//! The endpoint accepts a `tk` parameter derived from the request text and a
//! seed published in the translate web page as `tkk:'<hour>.<key>'`, where
//! `<hour>` is the number of hours since the Unix epoch when the seed was
//! issued. The seed is fetched for every signature and never stored.

use crate::error::SigningError;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Name of the query parameter carrying the signature.
pub const TOKEN_PARAM: &str = "tk";

static SEED_REGEX: OnceLock<Regex> = OnceLock::new();

fn seed_regex() -> &'static Regex {
    SEED_REGEX.get_or_init(|| {
        Regex::new(r#"tkk\s*[:=]\s*['"](\d+)\.(-?\d+)['"]"#).expect("seed pattern is valid")
    })
}

/// A signature valid for exactly one outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub param_name: String,
    pub param_value: String,
}

/// The `<hour>.<key>` seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSeed {
    pub hour: i64,
    pub key: i64,
}

impl TokenSeed {
    /// Locate the seed inside the translate web page.
    pub fn from_page(page: &str) -> Result<Self, SigningError> {
        let captures = seed_regex()
            .captures(page)
            .ok_or(SigningError::SeedNotFound)?;

        // Hours beyond the 32-bit range cannot come from a real seed
        let hour = captures[1]
            .parse::<i32>()
            .map(i64::from)
            .map_err(|_| SigningError::InvalidSeed(captures[0].to_string()))?;
        let key = captures[2]
            .parse()
            .map_err(|_| SigningError::InvalidSeed(captures[0].to_string()))?;

        Ok(Self { hour, key })
    }

    /// Hour window a seed issued now would carry.
    pub fn current_hour() -> i64 {
        chrono::Utc::now().timestamp() / 3600
    }
}

/// Fetches a fresh seed and signs request text with it.
#[derive(Debug, Clone)]
pub struct TokenSigner {
    client: reqwest::Client,
    seed_url: String,
    user_agent: String,
}

impl TokenSigner {
    pub fn new(client: reqwest::Client, seed_url: String, user_agent: String) -> Self {
        Self {
            client,
            seed_url,
            user_agent,
        }
    }

    /// Produce the `tk` parameter for `text`.
    pub async fn sign(&self, text: &str) -> Result<SignedToken, SigningError> {
        let seed = self.fetch_seed().await?;
        if seed.hour != TokenSeed::current_hour() {
            debug!(
                "Token seed hour {} differs from current hour {}",
                seed.hour,
                TokenSeed::current_hour()
            );
        }

        Ok(SignedToken {
            param_name: TOKEN_PARAM.to_string(),
            param_value: compute_token(text, seed),
        })
    }

    async fn fetch_seed(&self) -> Result<TokenSeed, SigningError> {
        debug!("Fetching token seed from {}", self.seed_url);

        let response = self
            .client
            .get(&self.seed_url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(SigningError::Unreachable)?;

        if !response.status().is_success() {
            return Err(SigningError::Status(response.status()));
        }

        let page = response.text().await.map_err(SigningError::Unreachable)?;
        TokenSeed::from_page(&page)
    }
}

/// Compute the token for `text` under `seed`.
///
/// Arithmetic follows 32-bit JavaScript integer semantics: `+` and `^` wrap to
/// a signed 32-bit value, `>>>` works on the unsigned view.
pub fn compute_token(text: &str, seed: TokenSeed) -> String {
    let mut a = seed.hour;
    for &byte in text.as_bytes() {
        a = a.wrapping_add(i64::from(byte));
        a = mix(a, b"+-a^+6");
    }
    a = mix(a, b"+-3^+b+-f");
    a = i64::from(a as i32 ^ seed.key as i32);
    if a < 0 {
        a = (a & 0x7FFF_FFFF) + 0x8000_0000;
    }
    a %= 1_000_000;

    format!("{}.{}", a, a as i32 ^ seed.hour as i32)
}

fn mix(mut a: i64, ops: &[u8]) -> i64 {
    for op in ops.chunks_exact(3) {
        let shift = if op[2] >= b'a' {
            u32::from(op[2] - 87)
        } else {
            u32::from(op[2] - b'0')
        };

        let d = if op[1] == b'+' {
            i64::from((a as u32) >> shift)
        } else {
            i64::from((a as i32).wrapping_shl(shift))
        };

        a = if op[0] == b'+' {
            i64::from(a.wrapping_add(d) as i32)
        } else {
            i64::from(a as i32 ^ d as i32)
        };
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const SEED: TokenSeed = TokenSeed {
        hour: 445_678,
        key: 1_618_542_197,
    };

    fn parts(token: &str) -> (i64, i64) {
        let (left, right) = token.split_once('.').expect("token has a dot");
        (left.parse().unwrap(), right.parse().unwrap())
    }

    // ==================== Seed Parsing Tests ====================

    #[test]
    fn test_seed_from_page_single_quotes() {
        let page = "<script>window.x={tkk:'445678.1618542197',foo:1}</script>";
        assert_eq!(TokenSeed::from_page(page).unwrap(), SEED);
    }

    #[test]
    fn test_seed_from_page_assignment_form() {
        let page = r#"var tkk = "12.-345";"#;
        assert_eq!(
            TokenSeed::from_page(page).unwrap(),
            TokenSeed { hour: 12, key: -345 }
        );
    }

    #[test]
    fn test_seed_missing_from_page() {
        let err = TokenSeed::from_page("<html>no seed here</html>").unwrap_err();
        assert!(matches!(err, SigningError::SeedNotFound));
    }

    #[test]
    fn test_seed_overflowing_hour_is_invalid() {
        let err = TokenSeed::from_page("tkk:'99999999999999999999.1'").unwrap_err();
        assert!(matches!(err, SigningError::InvalidSeed(_)));
    }

    #[test]
    fn test_seed_hour_outside_32_bits_is_invalid() {
        let err = TokenSeed::from_page("tkk:'9223372036854775807.1'").unwrap_err();
        assert!(matches!(err, SigningError::InvalidSeed(_)));

        let err = TokenSeed::from_page("tkk:'4294967296.1'").unwrap_err();
        assert!(matches!(err, SigningError::InvalidSeed(_)));
    }

    #[test]
    fn test_compute_token_huge_hour_does_not_overflow() {
        let seed = TokenSeed {
            hour: i64::MAX,
            key: 1,
        };
        let (first, _) = parts(&compute_token("a", seed));
        assert!((0..1_000_000).contains(&first));
    }

    #[test]
    fn test_current_hour_is_positive() {
        assert!(TokenSeed::current_hour() > 400_000);
    }

    // ==================== Token Computation Tests ====================

    #[test]
    fn test_compute_token_is_deterministic() {
        assert_eq!(compute_token("Hello", SEED), compute_token("Hello", SEED));
    }

    #[test]
    fn test_compute_token_depends_on_text() {
        assert_ne!(compute_token("Hello", SEED), compute_token("Hallo", SEED));
    }

    #[test]
    fn test_compute_token_depends_on_seed() {
        let other = TokenSeed {
            hour: SEED.hour + 1,
            ..SEED
        };
        assert_ne!(compute_token("Hello", SEED), compute_token("Hello", other));
    }

    #[test]
    fn test_compute_token_handles_multibyte_text() {
        let (first, second) = parts(&compute_token("こんにちは 😀", SEED));
        assert!((0..1_000_000).contains(&first));
        assert_eq!(second, first ^ SEED.hour);
    }

    #[test]
    fn test_compute_token_empty_text() {
        let (first, second) = parts(&compute_token("", SEED));
        assert!((0..1_000_000).contains(&first));
        assert_eq!(second, first ^ SEED.hour);
    }

    #[test]
    fn test_mix_shift_semantics() {
        // "+-a": a + (a << 10), "^+6": a ^ (a >>> 6)
        let a = mix(1, b"+-a^+6");
        let step = 1 + (1 << 10);
        assert_eq!(a, step ^ (step >> 6));
    }

    proptest! {
        #[test]
        fn test_token_shape(text in "\\PC{0,40}", hour in 0i64..1_000_000, key in any::<i32>()) {
            let seed = TokenSeed { hour, key: i64::from(key) };
            let token = compute_token(&text, seed);
            let (first, second) = parts(&token);
            prop_assert!((0..1_000_000).contains(&first));
            prop_assert_eq!(second, first ^ hour);
        }
    }

    // ==================== Signer Tests ====================

    #[tokio::test]
    async fn test_sign_fetches_seed_and_signs() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<script>c._tkk:'445678.1618542197'</script>"),
            )
            .expect(2)
            .mount(&mock_server)
            .await;

        let signer = TokenSigner::new(
            reqwest::Client::new(),
            format!("{}/", mock_server.uri()),
            "test-agent".to_string(),
        );

        let token = signer.sign("Hello").await.expect("Should sign");
        assert_eq!(token.param_name, "tk");
        assert_eq!(token.param_value, compute_token("Hello", SEED));

        // Seed is refetched on every signature
        signer.sign("Hello").await.expect("Should sign");
    }

    #[tokio::test]
    async fn test_sign_non_success_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let signer = TokenSigner::new(
            reqwest::Client::new(),
            mock_server.uri(),
            "test-agent".to_string(),
        );

        let err = signer.sign("Hello").await.unwrap_err();
        assert!(matches!(err, SigningError::Status(status) if status.as_u16() == 503));
    }

    #[tokio::test]
    async fn test_sign_seed_missing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&mock_server)
            .await;

        let signer = TokenSigner::new(
            reqwest::Client::new(),
            mock_server.uri(),
            "test-agent".to_string(),
        );

        let err = signer.sign("Hello").await.unwrap_err();
        assert!(matches!(err, SigningError::SeedNotFound));
    }

    #[tokio::test]
    async fn test_sign_unreachable() {
        let signer = TokenSigner::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1".to_string(),
            "test-agent".to_string(),
        );

        let err = signer.sign("Hello").await.unwrap_err();
        assert!(matches!(err, SigningError::Unreachable(_)));
    }
}
