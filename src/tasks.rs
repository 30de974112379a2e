//! Summarize, quiz, flashcard and Q&A generation
//!
//! Quiz and flashcards walk an escalation ladder, stopping at the
//! first usable result: JSON items, line-grammar items, a
//! reformat-as-JSON call, the secondary provider, and finally the
//! raw model text.

use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::
{   LearnovaConfig, GEMINI_MAX_OUTPUT_TOKENS, GEMINI_MODELS, GEMINI_TEMPERATURE
  , INSTRUCT_MODELS, QA_MODELS, SUMMARY_MODELS
};
use crate::error::Error;
use crate::failover::{try_in_order, Attempt, Candidate, CandidateList};
use crate::normalize::normalize;
use crate::parse::{self, StructuredItem};
use crate::providers::{HttpProvider, ModelProvider};
use crate::redact::redact;
use crate::request::
{   FlashcardItem, GenerationRequest, Generated, Payload, PayloadInput
  , QuizItem, Task
};

const EXAMPLE_CONTEXT: &str = "Context: The Moon is Earth's only natural \
satellite. It is the fifth largest satellite in the Solar System. The dark \
areas on its surface are called maria.";

const QUIZ_EXAMPLE: &str = "Quiz:
Q: What is the Moon's status relative to Earth?
A) A man-made satellite
B) A natural satellite
C) A dwarf planet
D) A star
Answer: B
Q: The dark areas on the Moon's surface are known as what?
A) Craters
B) Valleys
C) Maria
D) Highlands
Answer: C";

const FLASHCARD_EXAMPLE: &str = "Flashcards:
Flashcard 1:
Front: What is Earth's only natural satellite?
Back: The Moon
Flashcard 2:
Front: What are the dark areas on the Moon's surface called?
Back: Maria";

const COERCE_MAX_TOKENS: u32 = 600;

pub fn summary_prompt(clean: &str) -> String
{   format!(
      "Summarize the following text in 3-5 concise sentences. Do not \
       include links, emails, or promotional text. Output only the \
       summary. Text:\n\n{}",
      clean
    )
}

pub fn quiz_prompt(clean: &str, count: u32) -> String
{   format!(
      "[START OF EXAMPLE]\n{}\n{}\n[END OF EXAMPLE]\n\n\
       [START OF TASK]\nContext: {}\n\n\
       Generate exactly {} multiple-choice questions in the same format. \
       Each question must have 4 options (A-D) and indicate the correct \
       Answer.\n\nQuiz:",
      EXAMPLE_CONTEXT, QUIZ_EXAMPLE, clean, count
    )
}

pub fn flashcard_prompt(clean: &str, count: u32) -> String
{   format!(
      "[START OF EXAMPLE]\n{}\n{}\n[END OF EXAMPLE]\n\n\
       [START OF TASK]\nContext: {}\n\n\
       Generate exactly {} flashcards in the same format.\n\nFlashcards:",
      EXAMPLE_CONTEXT, FLASHCARD_EXAMPLE, clean, count
    )
}

pub fn coerce_prompt(raw: &str) -> String
{   format!(
      "Convert the following model output into valid JSON. Output ONLY \
       valid JSON.\n\n{}",
      raw
    )
}

/// Classic summarization models take the bare text, not an
/// instruction prompt.
pub fn is_summarization_model(model: &str) -> bool
{   let model = model.to_ascii_lowercase();
    ["bart", "pegasus", "summar"].iter().any(|tag| model.contains(tag))
}

/// Result of `Generator::run`; serializes as the endpoint
/// bodies `{"summary": ..}`, `{"quiz": ..}` and so on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskOutput
{   Summary(String)
  , Quiz(Generated<QuizItem>)
  , Flashcards(Generated<FlashcardItem>)
  , Answer(String)
}

/// Task facades over a model provider and fixed configuration
#[derive(Clone)]
pub struct Generator
{   provider: Arc<dyn ModelProvider>
  , config: Arc<LearnovaConfig>
}

impl Generator
{   /// Generator over the real HTTP providers
    pub fn new(config: LearnovaConfig) -> Result<Self, Error>
    {   let provider = HttpProvider::new(&config)?;
        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    pub fn with_provider(
      config: LearnovaConfig
    , provider: Arc<dyn ModelProvider>
    ) -> Self
    {   Generator
        {   provider
          , config: Arc::new(config)
        }
    }

    pub fn config(&self) -> &LearnovaConfig
    {   &self.config
    }

    // ===== Candidate lists =====

    /// Primary (configured or first default), then the configured
    /// fallback, then the remaining defaults
    pub fn summary_candidates(&self) -> CandidateList
    {   let models = &self.config.models;
        let primary = models.summary_model
          .as_deref()
          .or_else(|| SUMMARY_MODELS.first().copied());
        CandidateList::build(
          crate::Provider::HuggingFace
        , [primary, models.summary_fallback.as_deref()]
        , SUMMARY_MODELS
        )
    }

    pub fn instruct_candidates(&self) -> CandidateList
    {   CandidateList::build(
          crate::Provider::HuggingFace
        , [self.config.models.instruct_model.as_deref()]
        , INSTRUCT_MODELS
        )
    }

    pub fn secondary_candidates(&self) -> CandidateList
    {   CandidateList::build(
          crate::Provider::Gemini
        , [self.config.models.gemini_model.as_deref()]
        , GEMINI_MODELS
        )
    }

    pub fn qa_candidates(&self) -> CandidateList
    {   CandidateList::build(
          crate::Provider::HuggingFace
        , [self.config.models.qa_model.as_deref()]
        , QA_MODELS
        )
    }

    fn secondary_enabled(&self) -> bool
    {   self.provider.is_configured(crate::Provider::Gemini)
    }

    // ===== Facades =====

    /// Dispatch any request to its facade
    pub async fn run(&self, request: &GenerationRequest)
      -> Result<TaskOutput, Error>
    {   match &request.task
        {   Task::Summarize => {
              self.summarize_request(request).await.map(TaskOutput::Summary)
            }
          , Task::Quiz => {
              self.structured::<QuizItem>(request, quiz_prompt)
                .await
                .map(TaskOutput::Quiz)
            }
          , Task::Flashcards => {
              self.structured::<FlashcardItem>(request, flashcard_prompt)
                .await
                .map(TaskOutput::Flashcards)
            }
          , Task::QuestionAnswer { question } => {
              request.validate()?;
              self.answer_question(&request.input_text, question)
                .await
                .map(TaskOutput::Answer)
            }
        }
    }

    pub async fn summarize(&self, text: &str) -> Result<String, Error>
    {   self.summarize_request(&GenerationRequest::summarize(text)).await
    }

    pub async fn generate_quiz(&self, text: &str, count: u32)
      -> Result<Generated<QuizItem>, Error>
    {   let request = GenerationRequest::quiz(text, count);
        self.structured(&request, quiz_prompt).await
    }

    pub async fn generate_flashcards(&self, text: &str, count: u32)
      -> Result<Generated<FlashcardItem>, Error>
    {   let request = GenerationRequest::flashcards(text, count);
        self.structured(&request, flashcard_prompt).await
    }

    /// Extractive answer from a fixed QA model, single attempt
    pub async fn answer(&self, context: &str, question: &str)
      -> Result<String, Error>
    {   GenerationRequest::question_answer(context, question).validate()?;
        self.answer_question(context, question).await
    }

    // ===== Ladders =====

    async fn summarize_request(&self, request: &GenerationRequest)
      -> Result<String, Error>
    {   request.validate()?;
        let clean = redact(&request.input_text);
        let instruction = summary_prompt(&clean);
        let candidates = self.summary_candidates();

        let raw_text_style = candidates
          .first()
          .map_or(false, |c| is_summarization_model(&c.model));
        let (input, echo) = if raw_text_style
        {   (clean.clone(), None)
        } else
        {   (instruction.clone(), Some(instruction.as_str()))
        };
        let payload = request.payload(PayloadInput::Text(input));

        match try_in_order(self.provider.as_ref(), &candidates, &payload)
          .await
        {   Ok(attempt) => {
              info!("Summary produced by {}", attempt.used);
              let text = normalize(&attempt.response);
              Ok(parse::strip_echoed_prompt(&text, echo))
            }
          , Err(e) if self.secondary_enabled() => {
              warn!("Primary summary models failed, trying Gemini: {}", e);
              let payload = secondary_payload(&instruction);
              let attempt = try_in_order(
                self.provider.as_ref(),
                &self.secondary_candidates(),
                &payload
              ).await?;
              let text = normalize(&attempt.response);
              Ok(parse::strip_echoed_prompt(&text, Some(instruction.as_str())))
            }
          , Err(e) => Err(e)
        }
    }

    async fn structured<T: StructuredItem>(
      &self
    , request: &GenerationRequest
    , build_prompt: fn(&str, u32) -> String
    ) -> Result<Generated<T>, Error>
    {   request.validate()?;
        let clean = redact(&request.input_text);
        let count = request.count.unwrap_or(1);
        let prompt = build_prompt(&clean, count);
        let payload = request.payload(PayloadInput::Text(prompt.clone()));

        let primary = try_in_order(
          self.provider.as_ref(),
          &self.instruct_candidates(),
          &payload
        ).await;

        let primary_raw = match primary
        {   Ok(attempt) => {
              let raw = parse::strip_echoed_prompt(
                &normalize(&attempt.response),
                Some(prompt.as_str())
              );
              if let Some(items) = parse::resolve_items::<T>(&raw)
              {   info!(
                    "{}: {} items from {}",
                    T::LABEL, items.len(), attempt.used
                  );
                  return Ok(Generated::Items(items));
              }
              if let Some(items) = self.coerce_json::<T>(&attempt, &raw).await
              {   return Ok(Generated::Items(items));
              }
              Ok(raw)
            }
          , Err(e) => Err(e)
        };

        if self.secondary_enabled()
        {   match try_in_order(
              self.provider.as_ref(),
              &self.secondary_candidates(),
              &secondary_payload(&prompt)
            ).await
            {   Ok(attempt) => {
                  let text = parse::strip_echoed_prompt(
                    &normalize(&attempt.response),
                    Some(prompt.as_str())
                  );
                  if let Some(items) = parse::resolve_items::<T>(&text)
                  {   info!(
                        "{}: {} items from {}",
                        T::LABEL, items.len(), attempt.used
                      );
                      return Ok(Generated::Items(items));
                  }
                  debug!("{}: returning unparsed Gemini text", T::LABEL);
                  return Ok(Generated::Raw(text));
                }
              , Err(e) => warn!("Gemini fallback failed: {}", e)
            }
        }

        primary_raw.map(|raw| {
          debug!("{}: returning raw model text", T::LABEL);
          Generated::Raw(raw)
        })
    }

    /// Ask the model that produced `raw` to rewrite it as JSON
    async fn coerce_json<T: StructuredItem>(
      &self
    , attempt: &Attempt
    , raw: &str
    ) -> Option<Vec<T>>
    {   let payload = Payload::text(coerce_prompt(raw), COERCE_MAX_TOKENS, 0.0);
        let used: &Candidate = &attempt.used;
        match self.provider.call(used.provider, &used.model, &payload).await
        {   Ok(response) => {
              let items = parse::parse_json_items::<T>(&normalize(&response));
              if items.is_none()
              {   debug!("{}: reformatted output still not JSON", T::LABEL);
              }
              items
            }
          , Err(e) => {
              warn!("{}: reformat request to {} failed: {}", T::LABEL, used, e);
              None
            }
        }
    }

    async fn answer_question(&self, context: &str, question: &str)
      -> Result<String, Error>
    {   let candidates = self.qa_candidates();
        let candidate = candidates.first().ok_or_else(|| {
          Error::Configuration("no QA model".to_string())
        })?;
        let payload = Payload
        {   input: PayloadInput::Question
            {   question: redact(question)
              , context: redact(context)
            }
          , max_tokens: 0
          , temperature: 0.0
        };

        let response = self.provider
          .call(candidate.provider, &candidate.model, &payload)
          .await?;
        Ok(extract_answer(&response)
          .map(str::to_string)
          .unwrap_or_else(|| normalize(&response)))
    }
}

/// Gemini gets the same prompt with its own sampling settings
fn secondary_payload(prompt: &str) -> Payload
{   Payload::text(prompt, GEMINI_MAX_OUTPUT_TOKENS, GEMINI_TEMPERATURE)
}

/// `answer` field of a QA response or its first array element
fn extract_answer(response: &Value) -> Option<&str>
{   let object = match response
    {   Value::Array(items) => items.first()?
      , other => other
    };
    object.get("answer")?.as_str()
}
