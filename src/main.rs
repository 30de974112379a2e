use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{debug, error};
use serde_json::json;

use learnova::{GenerationRequest, Generator, LearnovaConfig};
use learnova::request::{DEFAULT_FLASHCARD_COUNT, DEFAULT_QUIZ_COUNT};

/// Study-material generation from the command line.
/// Credentials and model overrides come from the environment.
#[derive(Parser, Debug)]
#[command(name = "learnova", version)]
struct Cli
{   #[command(subcommand)]
    command: Command
}

#[derive(Subcommand, Debug)]
enum Command
{   /// Summarize text in a few sentences
    Summarize(Input)
  , /// Generate multiple-choice questions
    Quiz
    {   #[command(flatten)]
        input: Input
      , #[arg(short, long, default_value_t = DEFAULT_QUIZ_COUNT)]
        count: u32
    }
  , /// Generate front/back flashcards
    Flashcards
    {   #[command(flatten)]
        input: Input
      , #[arg(short, long, default_value_t = DEFAULT_FLASHCARD_COUNT)]
        count: u32
    }
  , /// Answer a question from the given context
    Qa
    {   #[command(flatten)]
        input: Input
      , #[arg(short, long)]
        question: String
    }
  , /// Report which providers have credentials
    Status
}

#[derive(clap::Args, Debug)]
struct Input
{   /// Read text from this file instead of stdin
    #[arg(short, long)]
    file: Option<PathBuf>
}

impl Input
{   fn read(&self) -> std::io::Result<String>
    {   match &self.file
        {   Some(path) => std::fs::read_to_string(path)
          , None => {
              let mut text = String::new();
              std::io::stdin().read_to_string(&mut text)?;
              Ok(text)
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode
{   env_logger::init();
    let cli = Cli::parse();
    let config = LearnovaConfig::from_env();

    let request = match build_request(&cli.command)
    {   None => {
          print_json(&json!({
            "hfConfigured": config.hugging_face.is_enabled(),
            "geminiConfigured": config.gemini.is_enabled(),
          }));
          return ExitCode::SUCCESS;
        }
      , Some(Ok(request)) => request
      , Some(Err(e)) => {
          error!("Failed to read input: {}", e);
          print_json(&json!({
            "message": "could not read input",
            "error": e.kind().to_string(),
          }));
          return ExitCode::FAILURE;
        }
    };

    let generator = match Generator::new(config)
    {   Ok(generator) => generator
      , Err(e) => return report(e)
    };

    debug!("Running {:?}", request.task);
    match generator.run(&request).await
    {   Ok(output) => {
          print_json(&output);
          ExitCode::SUCCESS
        }
      , Err(e) => report(e)
    }
}

/// `None` for commands that need no provider call
fn build_request(command: &Command)
  -> Option<std::io::Result<GenerationRequest>>
{   let request = match command
    {   Command::Status => return None
      , Command::Summarize(input) => input
          .read()
          .map(|text| GenerationRequest::summarize(text))
      , Command::Quiz { input, count } => input
          .read()
          .map(|text| GenerationRequest::quiz(text, *count))
      , Command::Flashcards { input, count } => input
          .read()
          .map(|text| GenerationRequest::flashcards(text, *count))
      , Command::Qa { input, question } => input
          .read()
          .map(|text| {
            GenerationRequest::question_answer(text, question.clone())
          })
    };
    Some(request)
}

/// Details go to the log; stdout only gets the low-detail message
fn report(e: learnova::Error) -> ExitCode
{   error!("Generation failed: {}", e);
    print_json(&json!({
      "message": "generation failed",
      "error": e.public_message(),
    }));
    ExitCode::FAILURE
}

fn print_json<T: serde::Serialize>(value: &T)
{   match serde_json::to_string_pretty(value)
    {   Ok(text) => println!("{}", text)
      , Err(e) => error!("Failed to serialize output: {}", e)
    }
}
