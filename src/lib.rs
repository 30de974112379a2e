pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod redact;
pub mod normalize;
pub mod parse;
pub mod failover;
pub mod tasks;
pub mod client;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use client::LearnovaBackend;
pub use config::LearnovaConfig;
pub use error::{Error, FailureKind};
pub use request::
{   FlashcardItem, GenerationRequest, Generated, QuizItem, Task
};
pub use tasks::{Generator, TaskOutput};

/*

learnova: study-material generation over hosted text models.

Text goes through redaction, a task prompt, a sequential fallback
over (provider, model) candidates, output normalization and then
JSON or line-grammar parsing. Nothing here persists; every stage
is a pure transformation of one request.

learnova/
├── src/
│   ├── lib.rs          # Provider enum, backend command types
│   ├── error.rs        # Error type and failure classification
│   ├── config.rs       # Immutable configuration (env / JSON)
│   ├── request.rs      # Requests, payloads, quiz/flashcard items
│   ├── redact.rs       # URL / email redaction
│   ├── normalize.rs    # Provider response -> plain text
│   ├── parse.rs        # Quiz / flashcard line grammars
│   ├── providers/      # HTTP clients (Hugging Face, Gemini)
│   ├── failover.rs     # Candidate lists and the fallback loop
│   ├── tasks.rs        # Summarize / quiz / flashcards / Q&A
│   ├── client.rs       # Channel-driven backend handle
│   └── main.rs         # CLI
└── tests/

*/

/// LEARNOVA BACKEND INTERFACE:

// ===== Summarize =====

pub type SummarizeReply = Result<String, crate::error::Error>;
pub type SummarizeReplySender
  = tokio::sync::mpsc::UnboundedSender<SummarizeReply>;

pub struct SummarizeArgs
{   pub text: String
  , pub reply: SummarizeReplySender
}

// ===== GenerateQuiz =====

pub type QuizReply
  = Result<Generated<QuizItem>, crate::error::Error>;
pub type QuizReplySender
  = tokio::sync::mpsc::UnboundedSender<QuizReply>;

pub struct QuizArgs
{   pub text: String
  , pub count: u32
  , pub reply: QuizReplySender
}

// ===== GenerateFlashcards =====

pub type FlashcardsReply
  = Result<Generated<FlashcardItem>, crate::error::Error>;
pub type FlashcardsReplySender
  = tokio::sync::mpsc::UnboundedSender<FlashcardsReply>;

pub struct FlashcardsArgs
{   pub text: String
  , pub count: u32
  , pub reply: FlashcardsReplySender
}

// ===== Answer =====

pub type AnswerReply = Result<String, crate::error::Error>;
pub type AnswerReplySender
  = tokio::sync::mpsc::UnboundedSender<AnswerReply>;

pub struct AnswerArgs
{   pub context: String
  , pub question: String
  , pub reply: AnswerReplySender
}

// ===== KillProcess =====

pub type KillProcessReply = Result<(), crate::error::Error>;
pub type KillProcessReplySender
  = tokio::sync::mpsc::UnboundedSender<KillProcessReply>;

pub struct KillProcessArgs
{   pub reply: KillProcessReplySender
}

// ===== LearnovaHand (sender side) =====

pub struct LearnovaHand
{   pub summarize_tx
      : tokio::sync::mpsc::UnboundedSender<SummarizeArgs>
  , pub quiz_tx
      : tokio::sync::mpsc::UnboundedSender<QuizArgs>
  , pub flashcards_tx
      : tokio::sync::mpsc::UnboundedSender<FlashcardsArgs>
  , pub answer_tx
      : tokio::sync::mpsc::UnboundedSender<AnswerArgs>
  , pub kill_process_tx
      : tokio::sync::mpsc::UnboundedSender<KillProcessArgs>
}

// ===== LearnovaFoot (receiver side) =====

pub struct LearnovaFoot
{   pub summarize_rx
      : tokio::sync::mpsc::UnboundedReceiver<SummarizeArgs>
  , pub quiz_rx
      : tokio::sync::mpsc::UnboundedReceiver<QuizArgs>
  , pub flashcards_rx
      : tokio::sync::mpsc::UnboundedReceiver<FlashcardsArgs>
  , pub answer_rx
      : tokio::sync::mpsc::UnboundedReceiver<AnswerArgs>
  , pub kill_process_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillProcessArgs>
}

/// LEARNOVA STRUCTURES:

/// Hosted text-generation services Learnova can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
pub enum Provider
{
  /// Hugging Face Inference API (bearer token, model in path)
  HuggingFace
  ,
  /// Google Generative Language API (key in query string)
  Gemini
}

impl Provider
{   /// Environment variable holding the credential
    pub fn key_var(&self) -> &'static str
    {   match self
        {   Provider::HuggingFace => "HF_API_KEY"
          , Provider::Gemini => "GEMINI_API_KEY"
        }
    }
}

impl fmt::Display for Provider
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   match self
        {   Provider::HuggingFace => write!(f, "HuggingFace")
          , Provider::Gemini => write!(f, "Gemini")
        }
    }
}
