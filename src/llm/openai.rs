use super::client::ModelClient;
use super::types::{InlineContent, Part};
use crate::{Error, Result, config::LlmConfig};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartAudio,
        ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageUrl, InputAudio, InputAudioFormat,
    },
};
use async_trait::async_trait;
use tracing::debug;

/// Client for OpenAI-compatible chat completion endpoints.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key);

        if !config.base_url.is_empty() {
            openai_config = openai_config.with_api_base(config.base_url);
        }

        let client = Client::with_config(openai_config);

        Self {
            client,
            model: config.model,
        }
    }
}

/// Maps request parts onto a single user message.
///
/// A lone text part stays a plain string; anything else becomes a content-part array.
pub fn to_user_content(parts: Vec<Part>) -> Result<ChatCompletionRequestUserMessageContent> {
    if let [Part::Text(text)] = parts.as_slice() {
        return Ok(ChatCompletionRequestUserMessageContent::Text(text.clone()));
    }

    let content_parts = parts
        .into_iter()
        .map(|part| match part {
            Part::Text(text) => Ok(ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText { text },
            )),
            Part::InlineData(inline) => inline_to_content_part(inline),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ChatCompletionRequestUserMessageContent::Array(content_parts))
}

fn inline_to_content_part(
    inline: InlineContent,
) -> Result<ChatCompletionRequestUserMessageContentPart> {
    let mime_type = inline.mime_type.to_ascii_lowercase();

    if mime_type.starts_with("image/") {
        return Ok(ChatCompletionRequestUserMessageContentPart::ImageUrl(
            ChatCompletionRequestMessageContentPartImage {
                image_url: ImageUrl {
                    url: format!("data:{};base64,{}", mime_type, inline.data),
                    detail: None,
                },
            },
        ));
    }

    let format = match mime_type.as_str() {
        "audio/wav" | "audio/x-wav" | "audio/wave" => InputAudioFormat::Wav,
        "audio/mpeg" | "audio/mp3" => InputAudioFormat::Mp3,
        other => {
            return Err(Error::llm(format!(
                "Unsupported attachment type for OpenAI-compatible provider: {}",
                other
            )));
        }
    };

    Ok(ChatCompletionRequestUserMessageContentPart::InputAudio(
        ChatCompletionRequestMessageContentPartAudio {
            input_audio: InputAudio {
                data: inline.data,
                format,
            },
        },
    ))
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn generate_content(&self, parts: Vec<Part>) -> Result<String> {
        debug!(
            "Creating chat completion with model {} from {} parts",
            self.model,
            parts.len()
        );

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(to_user_content(parts)?)
            .build()
            .map_err(|e| Error::llm(format!("Failed to build user message: {}", e)))?;

        let messages: Vec<ChatCompletionRequestMessage> = vec![message.into()];
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(request).await?;

        debug!(
            "Received chat completion response with {} choices",
            response.choices.len()
        );

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::llm("No text in chat completion response"))
    }
}
