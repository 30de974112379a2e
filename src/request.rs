//! Request, payload and result types

use serde::{Deserialize, Serialize};

pub const DEFAULT_QUIZ_COUNT: u32 = 5;
pub const DEFAULT_FLASHCARD_COUNT: u32 = 10;

/// What a request asks the models to produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Task
{   Summarize
  , Quiz
  , Flashcards
  , /// Extractive answer; the request text is the context
    QuestionAnswer { question: String }
}

/// One generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest
{   pub task: Task
  , /// Study text (or Q&A context)
    pub input_text: String
  , /// Number of quiz questions or flashcards
    pub count: Option<u32>
  , /// Sampling temperature
    pub temperature: f32
  , /// Max tokens to generate
    pub max_tokens: u32
}

impl GenerationRequest
{   pub fn summarize(text: impl Into<String>) -> Self
    {   GenerationRequest
        {   task: Task::Summarize
          , input_text: text.into()
          , count: None
          , temperature: 0.0
          , max_tokens: 200
        }
    }

    pub fn quiz(text: impl Into<String>, count: u32) -> Self
    {   GenerationRequest
        {   task: Task::Quiz
          , input_text: text.into()
          , count: Some(count)
          , temperature: 0.0
          , max_tokens: 700
        }
    }

    pub fn flashcards(text: impl Into<String>, count: u32) -> Self
    {   GenerationRequest
        {   task: Task::Flashcards
          , input_text: text.into()
          , count: Some(count)
          , temperature: 0.0
          , max_tokens: 700
        }
    }

    pub fn question_answer(
      context: impl Into<String>
    , question: impl Into<String>
    ) -> Self
    {   GenerationRequest
        {   task: Task::QuestionAnswer { question: question.into() }
          , input_text: context.into()
          , count: None
          , temperature: 0.0
          , max_tokens: 0
        }
    }

    /// Reject empty text and zero counts before any prompt is built
    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.input_text.trim().is_empty()
        {   return Err(crate::error::Error::InvalidInput(
              "text required".to_string()
            ));
        }
        if let Task::QuestionAnswer { question } = &self.task
        {   if question.trim().is_empty()
            {   return Err(crate::error::Error::InvalidInput(
                  "question required".to_string()
                ));
            }
        }
        if self.count == Some(0)
        {   return Err(crate::error::Error::InvalidInput(
              "count must be at least 1".to_string()
            ));
        }
        Ok(())
    }

    pub fn payload(&self, input: PayloadInput) -> Payload
    {   Payload
        {   input
          , max_tokens: self.max_tokens
          , temperature: self.temperature
        }
    }
}

/// Provider-neutral request body; each client encodes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload
{   pub input: PayloadInput
  , pub max_tokens: u32
  , pub temperature: f32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PayloadInput
{   Text(String)
  , Question
    {   question: String
      , context: String
    }
}

impl Payload
{   pub fn text(
      text: impl Into<String>
    , max_tokens: u32
    , temperature: f32
    ) -> Self
    {   Payload
        {   input: PayloadInput::Text(text.into())
          , max_tokens
          , temperature
        }
    }

    /// Input flattened to a single prompt string
    pub fn prompt_text(&self) -> String
    {   match &self.input
        {   PayloadInput::Text(text) => text.clone()
          , PayloadInput::Question { question, context } => {
              format!("Question: {}\nContext: {}", question, context)
            }
        }
    }
}

/// Multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem
{   pub question: String
  , pub choices: Vec<String>
  , #[serde(rename = "answerIndex")]
    pub answer_index: usize
}

impl QuizItem
{   pub const CHOICES: usize = 4;

    pub fn is_valid(&self) -> bool
    {   !self.question.trim().is_empty()
          && self.choices.len() == Self::CHOICES
          && self.answer_index < Self::CHOICES
    }
}

/// Front/back study card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardItem
{   #[serde(alias = "front")]
    pub question: String
  , #[serde(alias = "back", default)]
    pub answer: String
}

impl FlashcardItem
{   pub fn is_valid(&self) -> bool
    {   !self.question.trim().is_empty()
    }
}

/// Structured items, or the model's raw text when nothing parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Generated<T>
{   Items(Vec<T>)
  , Raw(String)
}

impl<T> Generated<T>
{   pub fn items(&self) -> Option<&[T]>
    {   match self
        {   Generated::Items(items) => Some(items.as_slice())
          , Generated::Raw(_) => None
        }
    }

    pub fn is_raw(&self) -> bool
    {   matches!(self, Generated::Raw(_))
    }
}
