use std::sync::Arc;
use tokio::sync::mpsc;
use log::{debug, error, info};
use crate::LearnovaFoot;
use crate::tasks::Generator;

/// Public API for the Learnova backend - owns the task
pub struct LearnovaBackend
{   hand: crate::LearnovaHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl LearnovaBackend
{   /// Spawn a backend over real HTTP providers.
    /// Must be called inside a tokio runtime.
    pub fn new(
      config: crate::config::LearnovaConfig
    ) -> Result<Self, crate::error::Error>
    {   Ok(Self::with_generator(Generator::new(config)?))
    }

    /// Spawn a backend over any generator
    pub fn with_generator(generator: Generator) -> Self
    {   debug!("Creating LearnovaBackend with task ownership");

        let (summarize_tx, summarize_rx)
          = mpsc::unbounded_channel();
        let (quiz_tx, quiz_rx)
          = mpsc::unbounded_channel();
        let (flashcards_tx, flashcards_rx)
          = mpsc::unbounded_channel();
        let (answer_tx, answer_rx)
          = mpsc::unbounded_channel();
        let (kill_process_tx, kill_process_rx)
          = mpsc::unbounded_channel();

        let hand = crate::LearnovaHand
        {   summarize_tx
          , quiz_tx
          , flashcards_tx
          , answer_tx
          , kill_process_tx
        };

        let foot = crate::LearnovaFoot
        {   summarize_rx
          , quiz_rx
          , flashcards_rx
          , answer_rx
          , kill_process_rx
        };

        let generator = Arc::new(generator);
        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, generator).await
        });

        LearnovaBackend
        {   hand
          , _task_handle
        }
    }

    /// Queue a summary - returns immediately
    pub fn summarize(
      &self
    , text: String
    ) -> Result<
        mpsc::UnboundedReceiver<crate::SummarizeReply>,
        crate::error::Error
      >
    {   debug!("summarize queuing {} chars", text.len());
        let (reply, reply_rx) = mpsc::unbounded_channel();
        self.hand.summarize_tx
          .send(crate::SummarizeArgs { text, reply })
          .map_err(|_| disconnected())?;
        Ok(reply_rx)
    }

    /// Queue a quiz - returns immediately
    pub fn generate_quiz(
      &self
    , text: String
    , count: u32
    ) -> Result<
        mpsc::UnboundedReceiver<crate::QuizReply>,
        crate::error::Error
      >
    {   debug!("generate_quiz queuing {} questions", count);
        let (reply, reply_rx) = mpsc::unbounded_channel();
        self.hand.quiz_tx
          .send(crate::QuizArgs { text, count, reply })
          .map_err(|_| disconnected())?;
        Ok(reply_rx)
    }

    /// Queue flashcards - returns immediately
    pub fn generate_flashcards(
      &self
    , text: String
    , count: u32
    ) -> Result<
        mpsc::UnboundedReceiver<crate::FlashcardsReply>,
        crate::error::Error
      >
    {   debug!("generate_flashcards queuing {} cards", count);
        let (reply, reply_rx) = mpsc::unbounded_channel();
        self.hand.flashcards_tx
          .send(crate::FlashcardsArgs { text, count, reply })
          .map_err(|_| disconnected())?;
        Ok(reply_rx)
    }

    /// Queue a question - returns immediately
    pub fn answer(
      &self
    , context: String
    , question: String
    ) -> Result<
        mpsc::UnboundedReceiver<crate::AnswerReply>,
        crate::error::Error
      >
    {   debug!("answer queuing question");
        let (reply, reply_rx) = mpsc::unbounded_channel();
        self.hand.answer_tx
          .send(crate::AnswerArgs { context, question, reply })
          .map_err(|_| disconnected())?;
        Ok(reply_rx)
    }

    /// Gracefully shutdown the backend
    pub async fn shutdown(self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down LearnovaBackend");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        self.hand.kill_process_tx
          .send(crate::KillProcessArgs { reply: reply_tx })
          .map_err(|_| {
            error!("Backend channel already closed");
            crate::error::Error::Other(
              "Backend already shutdown".to_string()
            )
          })?;

        // Wait for shutdown confirmation
        if let Some(result) = reply_rx.recv().await
        {   debug!("Backend shutdown confirmed");
            result
        } else
        {   error!("Backend dropped shutdown reply");
            Err(crate::error::Error::Other(
              "Backend stopped without confirming shutdown".to_string()
            ))
        }
    }
}

fn disconnected() -> crate::error::Error
{   error!("Backend channel closed");
    crate::error::Error::Other("Backend disconnected".to_string())
}

/// Main backend event loop
///
/// tokio::select! only routes: every task command is spawned
/// onto its own task, so a slow provider chain never holds up
/// other requests. Replies to callers that went away are dropped.
async fn run_backend_loop(
  foot: crate::LearnovaFoot
, generator: Arc<Generator>
)
{   debug!("Starting LearnovaBackend event loop");
    let LearnovaFoot
    {   mut summarize_rx
      , mut quiz_rx
      , mut flashcards_rx
      , mut answer_rx
      , mut kill_process_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = summarize_rx.recv() => {
          debug!("Received Summarize");
          let generator = Arc::clone(&generator);
          tokio::spawn(async move {
            let result = generator.summarize(&cmd.text).await;
            let _ = cmd.reply.send(result);
          });
        }
      , Some(cmd) = quiz_rx.recv() => {
          debug!("Received GenerateQuiz ({})", cmd.count);
          let generator = Arc::clone(&generator);
          tokio::spawn(async move {
            let result = generator
              .generate_quiz(&cmd.text, cmd.count)
              .await;
            let _ = cmd.reply.send(result);
          });
        }
      , Some(cmd) = flashcards_rx.recv() => {
          debug!("Received GenerateFlashcards ({})", cmd.count);
          let generator = Arc::clone(&generator);
          tokio::spawn(async move {
            let result = generator
              .generate_flashcards(&cmd.text, cmd.count)
              .await;
            let _ = cmd.reply.send(result);
          });
        }
      , Some(cmd) = answer_rx.recv() => {
          debug!("Received Answer");
          let generator = Arc::clone(&generator);
          tokio::spawn(async move {
            let result = generator
              .answer(&cmd.context, &cmd.question)
              .await;
            let _ = cmd.reply.send(result);
          });
        }
      , Some(cmd) = kill_process_rx.recv() => {
          debug!("Received KillProcess");
          let _ = cmd.reply.send(Ok(()));
          info!("LearnovaBackend shutting down");
          break;
        }
      , else => {
          debug!("All command channels closed");
          break;
        }
      }
    }
}
