//! The single model call of a run.

use tracing::{debug, info, warn};

use crate::anthropic::{AnthropicError, MessageSender, MessagesRequest, Usage};

/// What the model produced. Only `content` drives the run; the rest is logged.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub content: String,
    pub id: String,
    pub model: String,
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

/// Sends `prompt` once. No retry: any failure is returned as-is.
pub async fn invoke(
    sender: &impl MessageSender,
    model: &str,
    temperature: f64,
    max_tokens: u32,
    prompt: &str,
) -> Result<ModelResponse, AnthropicError> {
    let req = MessagesRequest::single_turn(model, max_tokens, temperature, prompt);
    let resp = sender.send_message(&req).await?;

    let content = resp.text().ok_or_else(|| AnthropicError::EmptyResponse {
        model: resp.model.clone(),
    })?;

    info!(
        request_id = %resp.id,
        model = %resp.model,
        input_tokens = resp.usage.input_tokens,
        output_tokens = resp.usage.output_tokens,
        total_tokens = resp.usage.total(),
        "model call completed"
    );
    if resp.stop_reason.as_deref() == Some("max_tokens") {
        warn!(model = %resp.model, "response was truncated at max_tokens");
    }
    debug!("raw model response: {}", content.escape_debug());

    Ok(ModelResponse {
        content,
        id: resp.id,
        model: resp.model,
        stop_reason: resp.stop_reason,
        usage: resp.usage,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use crate::anthropic::types::{ContentBlock, MessagesResponse};
    use crate::anthropic::{AnthropicError, MessageSender, MessagesRequest, Usage};

    /// Canned sender that records every request it receives.
    pub struct MockSender {
        reply: Result<String, u16>,
        pub requests: RefCell<Vec<MessagesRequest>>,
    }

    impl MockSender {
        pub fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                requests: RefCell::new(Vec::new()),
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                requests: RefCell::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl MessageSender for MockSender {
        async fn send_message(
            &self,
            req: &MessagesRequest,
        ) -> Result<MessagesResponse, AnthropicError> {
            self.requests.borrow_mut().push(req.clone());
            match &self.reply {
                Ok(text) => Ok(MessagesResponse {
                    id: "msg_mock".into(),
                    content: vec![ContentBlock {
                        content_type: "text".into(),
                        text: text.clone(),
                    }],
                    model: req.model.clone(),
                    stop_reason: Some("end_turn".into()),
                    usage: Usage {
                        input_tokens: 3,
                        output_tokens: 1,
                    },
                }),
                Err(status) => Err(AnthropicError::ApiError {
                    status: *status,
                    message: "mock error".into(),
                }),
            }
        }
    }
}
