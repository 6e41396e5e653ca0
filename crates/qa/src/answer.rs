//! Answer assembly.
//!
//! Turns the model's reply into the outbound [`AnswerResult`]. A refusal is
//! an error, never an empty answer. `sources` lists exactly the URLs that were
//! in the prompt.

use serde::{Deserialize, Serialize};
use sitesage_core::{AskError, PageMap, ProviderResponse, Question, Usage};

/// What the assembler needs from the LLM reply.
#[derive(Debug, Clone, Default)]
pub struct LlmReply {
    pub answer: String,
    /// `Some` when the model declined to answer.
    pub refusal: Option<String>,
    pub usage: Option<Usage>,
}

impl LlmReply {
    pub fn is_refusal(&self) -> bool {
        self.refusal.is_some()
    }
}

impl From<ProviderResponse> for LlmReply {
    fn from(response: ProviderResponse) -> Self {
        Self {
            answer: response.message.content,
            refusal: response.refusal,
            usage: response.usage,
        }
    }
}

/// Token accounting as reported to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerUsage {
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

impl From<Option<Usage>> for AnswerUsage {
    fn from(usage: Option<Usage>) -> Self {
        let usage = usage.unwrap_or_default();
        Self {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        }
    }
}

/// A successful answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    #[serde(rename = "user_question")]
    pub question: String,
    #[serde(rename = "answer")]
    pub answer_text: String,
    pub usage: AnswerUsage,
    /// URLs whose text was in the prompt, in URL order.
    pub sources: Vec<String>,
}

/// Build the answer for `question` from the model's `reply`.
///
/// `trimmed` must be the exact page set that was sent to the model.
pub fn assemble(
    question: &Question,
    trimmed: &PageMap,
    reply: LlmReply,
) -> Result<AnswerResult, AskError> {
    if let Some(reason) = reply.refusal {
        return Err(AskError::Refused {
            reason: Some(reason).filter(|r| !r.is_empty()),
        });
    }

    Ok(AnswerResult {
        question: question.as_str().to_string(),
        answer_text: reply.answer,
        usage: reply.usage.into(),
        sources: trimmed.keys().cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitesage_core::Message;

    fn trimmed() -> PageMap {
        PageMap::from([
            ("https://s.test/b".to_string(), "beta".to_string()),
            ("https://s.test/a".to_string(), "alpha".to_string()),
        ])
    }

    fn question() -> Question {
        Question::validate("What is alpha?").unwrap()
    }

    #[test]
    fn successful_reply_becomes_answer() {
        let reply = LlmReply {
            answer: "The first letter.".into(),
            refusal: None,
            usage: Some(Usage {
                prompt_tokens: Some(100),
                completion_tokens: Some(5),
                total_tokens: Some(105),
            }),
        };
        let result = assemble(&question(), &trimmed(), reply).unwrap();
        assert_eq!(result.question, "What is alpha?");
        assert_eq!(result.answer_text, "The first letter.");
        assert_eq!(result.usage.input_tokens, Some(100));
        assert_eq!(result.usage.output_tokens, Some(5));
        assert_eq!(result.sources, vec!["https://s.test/a", "https://s.test/b"]);
    }

    #[test]
    fn refusal_is_an_error() {
        let reply = LlmReply {
            answer: String::new(),
            refusal: Some("I can't help with that.".into()),
            usage: None,
        };
        match assemble(&question(), &trimmed(), reply) {
            Err(AskError::Refused { reason }) => {
                assert_eq!(reason.as_deref(), Some("I can't help with that."));
            }
            other => panic!("expected refusal, got {other:?}"),
        }
    }

    #[test]
    fn missing_usage_serializes_as_null() {
        let result = assemble(&question(), &trimmed(), LlmReply::default()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["usage"]["input_tokens"], serde_json::Value::Null);
        assert_eq!(json["usage"]["output_tokens"], serde_json::Value::Null);
        assert_eq!(json["user_question"], "What is alpha?");
        assert_eq!(json["answer"], "");
    }

    #[test]
    fn sources_come_from_trimmed_pages_only() {
        let only_b = PageMap::from([("https://s.test/b".to_string(), "beta".to_string())]);
        let result = assemble(&question(), &only_b, LlmReply::default()).unwrap();
        assert_eq!(result.sources, vec!["https://s.test/b"]);
    }

    #[test]
    fn reply_from_provider_response() {
        let reply = LlmReply::from(ProviderResponse {
            message: Message::assistant("hi"),
            refusal: Some("no".into()),
            usage: None,
            model: "m".into(),
        });
        assert_eq!(reply.answer, "hi");
        assert!(reply.is_refusal());
    }
}
