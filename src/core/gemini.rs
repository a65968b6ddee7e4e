use async_trait::async_trait;
use tracing::{debug, trace};

use crate::api::{
    Content, EmptyObject, GenerateContentRequest, GenerateContentResponse, RetrievalConfig, Tool,
    ToolConfig,
};
use crate::core::chat_stream::{format_api_error, spawn_stream, StreamParams};
use crate::core::constants::DEFAULT_BASE_URL;
use crate::core::error::ChatError;
use crate::core::provider::{
    ChatSession, ChunkStream, GroundedAnswer, GroundingTool, ModelProvider,
};
use crate::utils::url::construct_api_url;

/// Gemini REST client. A missing API key is not an error until a request is
/// attempted, so the client can be built before credentials exist.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, ChatError> {
        self.api_key.as_deref().ok_or_else(ChatError::missing_api_key)
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        construct_api_url(&self.base_url, &format!("models/{model}:{method}"))
    }
}

pub(crate) fn build_contents(session: &ChatSession, message: &str) -> Vec<Content> {
    session
        .history()
        .iter()
        .map(|turn| Content::text(turn.role.as_str(), turn.text.clone()))
        .chain(std::iter::once(Content::text("user", message)))
        .collect()
}

pub(crate) fn build_tools(tools: &[GroundingTool]) -> (Vec<Tool>, Option<ToolConfig>) {
    let mut built = Vec::with_capacity(tools.len());
    let mut tool_config = None;

    for tool in tools {
        match tool {
            GroundingTool::GoogleSearch => built.push(Tool {
                google_search: Some(EmptyObject {}),
                ..Tool::default()
            }),
            GroundingTool::GoogleMaps { location } => {
                built.push(Tool {
                    google_maps: Some(EmptyObject {}),
                    ..Tool::default()
                });
                if let Some(lat_lng) = location {
                    tool_config = Some(ToolConfig {
                        retrieval_config: RetrievalConfig { lat_lng: *lat_lng },
                    });
                }
            }
        }
    }

    (built, tool_config)
}

#[async_trait]
impl ModelProvider for GeminiClient {
    async fn send_and_stream(
        &self,
        session: &ChatSession,
        message: &str,
    ) -> Result<ChunkStream, ChatError> {
        let api_key = self.api_key()?.to_string();
        let request = GenerateContentRequest {
            contents: build_contents(session, message),
            tools: Vec::new(),
            tool_config: None,
        };

        debug!(
            model = session.model(),
            history = session.history().len(),
            "starting streamed reply"
        );

        Ok(spawn_stream(StreamParams {
            client: self.client.clone(),
            url: self.model_url(session.model(), "streamGenerateContent"),
            api_key,
            request,
        }))
    }

    async fn reply(&self, session: &ChatSession, message: &str) -> Result<String, ChatError> {
        let request = GenerateContentRequest {
            contents: build_contents(session, message),
            tools: Vec::new(),
            tool_config: None,
        };
        let response = self.post_generate(session.model(), &request).await?;
        Ok(response.text())
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        tools: &[GroundingTool],
    ) -> Result<GroundedAnswer, ChatError> {
        let (tools, tool_config) = build_tools(tools);
        let request = GenerateContentRequest {
            contents: vec![Content::text("user", prompt)],
            tools,
            tool_config,
        };

        let parsed = self.post_generate(model, &request).await?;
        Ok(GroundedAnswer {
            text: parsed.text(),
            sources: parsed.grounding_sources(),
        })
    }
}

impl GeminiClient {
    /// Non-streaming `generateContent` call.
    async fn post_generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ChatError> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .post(self.model_url(model, "generateContent"))
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Transport(format_api_error(&body)));
        }

        let body = response.text().await?;
        trace!("generateContent response: {body}");

        serde_json::from_str(&body)
            .map_err(|e| ChatError::Transport(format!("Failed to parse response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::LatLng;
    use crate::core::message::Role;
    use crate::core::provider::Turn;
    use futures_util::StreamExt;

    #[test]
    fn contents_replay_history_before_new_message() {
        let session = ChatSession::new(
            "gemini-2.5-flash",
            vec![Turn::new(Role::User, "hi"), Turn::new(Role::Model, "hello")],
        );
        let contents = build_contents(&session, "next");

        let roles: Vec<_> = contents
            .iter()
            .map(|c| c.role.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert_eq!(contents[2].parts[0].text.as_deref(), Some("next"));
    }

    #[test]
    fn maps_location_becomes_tool_config() {
        let location = LatLng {
            latitude: 59.9,
            longitude: 10.7,
        };
        let (tools, config) = build_tools(&[
            GroundingTool::GoogleSearch,
            GroundingTool::GoogleMaps {
                location: Some(location),
            },
        ]);

        assert_eq!(tools.len(), 2);
        assert!(tools[0].google_search.is_some());
        assert!(tools[1].google_maps.is_some());
        assert_eq!(
            config.map(|c| c.retrieval_config.lat_lng),
            Some(location)
        );
    }

    #[test]
    fn model_urls_follow_base_url() {
        let client = GeminiClient::new(Some("k".into()), Some("https://example.test/v1beta/".into()));
        assert_eq!(
            client.model_url("gemini-2.5-flash", "generateContent"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = GeminiClient::new(Some("   ".into()), None);
        assert!(!client.has_api_key());

        let session = client.create_session("gemini-2.5-flash", Vec::new());
        let err = match client.send_and_stream(&session, "hi").await {
            Ok(mut stream) => panic!("expected configuration error, got {:?}", stream.next().await),
            Err(err) => err,
        };
        assert!(matches!(err, ChatError::Configuration(_)));

        let err = client
            .generate("gemini-2.5-flash", "hi", &[GroundingTool::GoogleSearch])
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Configuration(_)));

        let err = client.reply(&session, "hi").await.unwrap_err();
        assert!(matches!(err, ChatError::Configuration(_)));
    }
}
