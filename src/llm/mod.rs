//! Inference gateway: one text-in, text-out call per command.
//!
//! Checks configuration before touching the network, keeps a client handle
//! bound to the credential it was built with, and reduces provider responses
//! to the trimmed text of the first candidate.

pub mod client;
pub mod types;

use std::sync::Arc;

use tracing::{debug, info};

pub use client::{GeminiClient, LlmError, OpenAiClient, TextGenerator};
use types::GenerationRequest;

use crate::config::{Provider, Settings};

/// Builds a client for the given settings and credential.
pub type Connector = Box<dyn Fn(&Settings, &str) -> Arc<dyn TextGenerator> + Send + Sync>;

/// Default connector: a real HTTP client for the configured provider.
fn connect(settings: &Settings, api_key: &str) -> Arc<dyn TextGenerator> {
    let api_key = api_key.to_string();
    match (settings.provider, settings.base_url.clone()) {
        (Provider::Gemini, Some(url)) => Arc::new(GeminiClient::with_base_url(api_key, url)),
        (Provider::Gemini, None) => Arc::new(GeminiClient::new(api_key)),
        (Provider::OpenAi, Some(url)) => Arc::new(OpenAiClient::with_base_url(api_key, url)),
        (Provider::OpenAi, None) => Arc::new(OpenAiClient::new(api_key)),
    }
}

struct CachedClient {
    provider: Provider,
    api_key: String,
    client: Arc<dyn TextGenerator>,
}

/// Credential-keyed client cache plus the request/response normalization.
pub struct InferenceGateway {
    connector: Connector,
    cached: Option<CachedClient>,
}

impl Default for InferenceGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InferenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceGateway")
            .field("cached", &self.cached.as_ref().map(|c| c.provider))
            .finish()
    }
}

impl InferenceGateway {
    /// Gateway that talks to the real provider APIs.
    pub fn new() -> Self {
        Self::with_connector(connect)
    }

    /// Gateway with a custom client factory (mock generators in tests).
    pub fn with_connector(
        connector: impl Fn(&Settings, &str) -> Arc<dyn TextGenerator> + Send + Sync + 'static,
    ) -> Self {
        Self {
            connector: Box::new(connector),
            cached: None,
        }
    }

    /// Client for the configured credential, rebuilt when the credential or
    /// provider differs from the cached one.
    pub fn client(&mut self, settings: &Settings) -> Result<Arc<dyn TextGenerator>, LlmError> {
        let api_key = credential(settings)?;

        if let Some(cached) = &self.cached {
            if cached.api_key == api_key && cached.provider == settings.provider {
                return Ok(Arc::clone(&cached.client));
            }
        }

        info!(provider = %settings.provider, "building inference client");
        let client = (self.connector)(settings, api_key);
        self.cached = Some(CachedClient {
            provider: settings.provider,
            api_key: api_key.to_string(),
            client: Arc::clone(&client),
        });
        Ok(client)
    }

    /// Drop the cached client (credential changed, or shutting down).
    pub fn invalidate(&mut self) {
        if self.cached.take().is_some() {
            debug!("inference client dropped");
        }
    }

    pub fn has_client(&self) -> bool {
        self.cached.is_some()
    }

    /// Send `content` with `system_prompt`; return the trimmed answer.
    ///
    /// Configuration is checked first (credential, then model), so a missing
    /// value never reaches the network.
    pub async fn generate(
        &mut self,
        settings: &Settings,
        content: &str,
        system_prompt: &str,
    ) -> Result<String, LlmError> {
        credential(settings)?;
        let request = build_request(settings, content, system_prompt)?;
        let client = self.client(settings)?;
        complete(client.as_ref(), &request).await
    }
}

fn credential(settings: &Settings) -> Result<&str, LlmError> {
    settings
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            LlmError::MissingApiKey(format!(
                "set `api_key` in the config file or {}",
                settings.provider.env_var()
            ))
        })
}

/// Request for the configured model and sampling parameters.
pub fn build_request(
    settings: &Settings,
    content: &str,
    system_prompt: &str,
) -> Result<GenerationRequest, LlmError> {
    let model = settings
        .model
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .ok_or(LlmError::MissingModel)?;

    Ok(GenerationRequest {
        model: model.to_string(),
        content: content.to_string(),
        system_prompt: system_prompt.to_string(),
        max_output_tokens: Some(settings.max_output_tokens),
        temperature: settings.temperature,
    })
}

/// Run one request and reduce the response to text.
pub async fn complete(client: &dyn TextGenerator, request: &GenerationRequest) -> Result<String, LlmError> {
    info!(
        provider = %client.provider(),
        model = %request.model,
        chars = request.content.chars().count(),
        "requesting generation"
    );

    let generation = client.generate(request).await?;
    match generation.first_text().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(LlmError::Empty {
            reason: generation.stop_reason(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use types::{Candidate, Generation};

    struct Fixed {
        generation: Generation,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl TextGenerator for Fixed {
        fn provider(&self) -> Provider {
            Provider::Gemini
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<Generation, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.generation.clone())
        }
    }

    fn answer(text: &str) -> Generation {
        Generation {
            candidates: vec![Candidate {
                parts: vec![text.to_string()],
                finish_reason: Some("STOP".into()),
            }],
            block_reason: None,
        }
    }

    fn settings(key: Option<&str>, model: Option<&str>) -> Settings {
        Settings {
            api_key: key.map(str::to_string),
            model: model.map(str::to_string),
            ..Settings::default()
        }
    }

    /// Gateway returning `generation`, counting builds and calls.
    fn gateway(generation: Generation) -> (InferenceGateway, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let builds = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let (b, c) = (Arc::clone(&builds), Arc::clone(&calls));
        let gw = InferenceGateway::with_connector(move |_, _| {
            b.fetch_add(1, Ordering::SeqCst);
            Arc::new(Fixed {
                generation: generation.clone(),
                calls: Arc::clone(&c),
            })
        });
        (gw, builds, calls)
    }

    #[tokio::test]
    async fn returns_trimmed_first_part() {
        let (mut gw, _, _) = gateway(answer("  The cat sat.\n"));
        let text = gw
            .generate(&settings(Some("k"), Some("m")), "Teh cat sat.", "fix")
            .await
            .unwrap();
        assert_eq!(text, "The cat sat.");
    }

    #[tokio::test]
    async fn missing_key_never_builds_a_client() {
        let (mut gw, builds, calls) = gateway(answer("x"));
        let err = gw
            .generate(&settings(None, Some("m")), "content here", "p")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey(_)));
        assert_eq!(builds.load(Ordering::SeqCst), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn blank_key_counts_as_missing() {
        let (mut gw, _, _) = gateway(answer("x"));
        let err = gw
            .generate(&settings(Some("  "), Some("m")), "content here", "p")
            .await
            .unwrap_err();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn missing_model_never_calls() {
        let (mut gw, builds, calls) = gateway(answer("x"));
        let err = gw
            .generate(&settings(Some("k"), None), "content here", "p")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingModel));
        assert_eq!(builds.load(Ordering::SeqCst), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_answer_reports_reason() {
        let generation = Generation {
            candidates: vec![Candidate {
                parts: vec![],
                finish_reason: Some("SAFETY".into()),
            }],
            block_reason: None,
        };
        let (mut gw, _, _) = gateway(generation);
        let err = gw
            .generate(&settings(Some("k"), Some("m")), "content here", "p")
            .await
            .unwrap_err();
        match err {
            LlmError::Empty { reason } => assert_eq!(reason, "SAFETY"),
            other => panic!("expected Empty, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn client_is_reused_until_credential_changes() {
        let (mut gw, builds, calls) = gateway(answer("ok"));
        let a = settings(Some("key-a"), Some("m"));
        gw.generate(&a, "first call", "p").await.unwrap();
        gw.generate(&a, "second call", "p").await.unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let b = settings(Some("key-b"), Some("m"));
        gw.generate(&b, "third call", "p").await.unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalidate_drops_client() {
        let (mut gw, builds, _) = gateway(answer("ok"));
        let s = settings(Some("k"), Some("m"));
        gw.client(&s).unwrap();
        assert!(gw.has_client());
        gw.invalidate();
        assert!(!gw.has_client());
        gw.client(&s).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn request_carries_sampling_settings() {
        let mut s = settings(Some("k"), Some("gemini-2.0-flash"));
        s.temperature = Some(0.3);
        let req = build_request(&s, "body", "system").unwrap();
        assert_eq!(req.model, "gemini-2.0-flash");
        assert_eq!(req.max_output_tokens, Some(s.max_output_tokens));
        assert_eq!(req.temperature, Some(0.3));
    }
}
