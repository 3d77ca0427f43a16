//! Prompt-driven provider over an opaque text generator.
//!
//! The generator may answer with a bare summary, a `{"summary": ...}` JSON
//! object, or that object inside a fenced code block.

use super::provider::{SummaryError, SummaryProvider, SummaryRequest, SummaryResponse};
use async_trait::async_trait;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static FENCED_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```$").expect("valid fenced block regex")
});

/// Prompt in, completion out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, SummaryError>;
}

/// Builds the daily-summary prompt for one date group.
pub fn render_prompt(request: &SummaryRequest) -> String {
    let mut prompt = format!(
        "You are a personal assistant tasked with summarizing daily notes.\n\n\
         Summarize the following notes for the date {}. Focus on key points and important details.\n\n\
         Notes:\n",
        request.date
    );
    for note in &request.notes {
        prompt.push_str("- ");
        prompt.push_str(note);
        prompt.push('\n');
    }
    prompt
}

pub struct PromptSummaryProvider<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> PromptSummaryProvider<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl<G: TextGenerator> SummaryProvider for PromptSummaryProvider<G> {
    async fn summarize(&self, request: SummaryRequest) -> Result<SummaryResponse, SummaryError> {
        request.validate()?;
        let prompt = render_prompt(&request);
        debug!(
            "event=summary_prompt module=summary date={} notes={} prompt_chars={}",
            request.date,
            request.notes.len(),
            prompt.chars().count()
        );
        let raw = self.generator.generate(&prompt).await?;
        parse_completion(&raw)
    }
}

fn parse_completion(raw: &str) -> Result<SummaryResponse, SummaryError> {
    let trimmed = raw.trim();
    let body = FENCED_BLOCK_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map_or(trimmed, |m| m.as_str());

    let response = if body.starts_with('{') {
        serde_json::from_str::<SummaryResponse>(body)
            .map_err(|err| SummaryError::MalformedOutput(err.to_string()))?
    } else {
        SummaryResponse {
            summary: body.to_string(),
        }
    };
    response.validate()?;
    Ok(SummaryResponse {
        summary: response.summary.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_completion, render_prompt, PromptSummaryProvider, TextGenerator};
    use crate::summary::provider::{SummaryError, SummaryProvider, SummaryRequest};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoGenerator {
        reply: String,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, SummaryError> {
            self.seen.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn request() -> SummaryRequest {
        SummaryRequest {
            date: "2024-01-05".to_string(),
            notes: vec!["gym".to_string(), "call mom".to_string()],
        }
    }

    #[test]
    fn prompt_lists_notes_in_order() {
        let prompt = render_prompt(&request());
        assert!(prompt.contains("for the date 2024-01-05"));
        let gym = prompt.find("- gym").expect("first note listed");
        let call = prompt.find("- call mom").expect("second note listed");
        assert!(gym < call);
    }

    #[test]
    fn completion_accepts_plain_json_and_fenced_json() {
        assert_eq!(parse_completion(" Busy day. ").unwrap().summary, "Busy day.");
        assert_eq!(
            parse_completion(r#"{"summary":"Gym, then family."}"#)
                .unwrap()
                .summary,
            "Gym, then family."
        );
        assert_eq!(
            parse_completion("```json\n{\"summary\": \"Fenced.\"}\n```")
                .unwrap()
                .summary,
            "Fenced."
        );
    }

    #[test]
    fn completion_rejects_broken_json_and_blank_output() {
        assert!(matches!(
            parse_completion("{\"summary\": "),
            Err(SummaryError::MalformedOutput(_))
        ));
        assert!(matches!(
            parse_completion("   "),
            Err(SummaryError::MalformedOutput(_))
        ));
    }

    #[tokio::test]
    async fn provider_sends_rendered_prompt() {
        let generator = EchoGenerator {
            reply: "Went to the gym and called mom.".to_string(),
            seen: Mutex::new(Vec::new()),
        };
        let provider = PromptSummaryProvider::new(generator);
        let response = provider.summarize(request()).await.unwrap();
        assert_eq!(response.summary, "Went to the gym and called mom.");
        let seen = provider.generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("- call mom"));
    }
}
