//! Parsers for loosely formatted model output
//!
//! Models are shown a worked example in the prompt and usually
//! follow it, but not always. The line grammars below recover
//! what they can and drop the rest.

use std::sync::OnceLock;

use log::{debug, trace};
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::request::{FlashcardItem, QuizItem};

const ANSWER_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

fn choice_pattern() -> &'static Regex
{   static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
      Regex::new(r"(?i)^([A-D])\)\s*(.*)$").expect("valid choice pattern")
    })
}

fn flashcard_header_pattern() -> &'static Regex
{   static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
      Regex::new(r"(?i)^Flashcard\s*\d+").expect("valid header pattern")
    })
}

/// Rest of `line` after a case-insensitive `label`
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str>
{   let head = line.get(..label.len())?;
    if head.eq_ignore_ascii_case(label)
    {   Some(line[label.len()..].trim())
    } else
    {   None
    }
}

fn content_lines(text: &str) -> Vec<&str>
{   text.lines()
      .map(str::trim)
      .filter(|l| !l.is_empty())
      .collect()
}

/// `B`, `b`, `B)`, `B. text` map to 1; `Banana` does not
fn answer_index(answer: &str) -> Option<usize>
{   let mut chars = answer.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if chars.next().map_or(false, char::is_alphanumeric)
    {   return None;
    }
    ANSWER_LETTERS.iter().position(|&l| l == letter)
}

/// Parse `Q:` / `A)`..`D)` / `Answer:` blocks.
///
/// A block is kept only with a question, exactly four choices
/// and a valid answer letter. Returns `None` when no block was
/// kept.
pub fn parse_quiz(text: &str) -> Option<Vec<QuizItem>>
{   let lines = content_lines(text);
    let mut items = Vec::new();
    let mut i = 0;

    while i < lines.len()
    {   let question = match strip_label(lines[i], "Q:")
        {   Some(q) => q.to_string()
          , None => { i += 1; continue; }
        };
        i += 1;

        let mut choices = Vec::with_capacity(QuizItem::CHOICES);
        while i < lines.len() && choices.len() < QuizItem::CHOICES
        {   match choice_pattern().captures(lines[i])
            {   Some(caps) => {
                  choices.push(caps[2].trim().to_string());
                  i += 1;
                }
              , None => break
            }
        }

        let mut answer = None;
        if i < lines.len()
        {   if let Some(rest) = strip_label(lines[i], "Answer:")
            {   answer = answer_index(rest);
                i += 1;
            }
        }

        match answer
        {   Some(answer_index)
              if !question.is_empty()
                && choices.len() == QuizItem::CHOICES => {
              items.push(QuizItem { question, choices, answer_index });
            }
          , _ => {
              trace!(
                "Dropping quiz block '{}' ({} choices, answer {:?})",
                question, choices.len(), answer
              );
            }
        }
    }

    debug!("Parsed {} quiz items from text", items.len());
    if items.is_empty() { None } else { Some(items) }
}

/// Parse `Flashcard N` / `Front:` / `Back:` blocks.
///
/// A card is kept whenever its front is non-empty; a missing
/// back becomes an empty answer. Returns `None` when no card
/// was kept.
pub fn parse_flashcards(text: &str) -> Option<Vec<FlashcardItem>>
{   let lines = content_lines(text);
    let mut items = Vec::new();
    let mut i = 0;

    while i < lines.len()
    {   if flashcard_header_pattern().is_match(lines[i])
        {   i += 1;
            continue;
        }
        let front = match strip_label(lines[i], "Front:")
        {   Some(front) => front.to_string()
          , None => { i += 1; continue; }
        };
        i += 1;

        let mut back = String::new();
        if i < lines.len()
        {   if let Some(rest) = strip_label(lines[i], "Back:")
            {   back = rest.to_string();
                i += 1;
            }
        }

        if !front.is_empty()
        {   items.push(FlashcardItem { question: front, answer: back });
        }
    }

    debug!("Parsed {} flashcards from text", items.len());
    if items.is_empty() { None } else { Some(items) }
}

/// Item types the generator can resolve from model output
pub trait StructuredItem: DeserializeOwned + Sized
{   /// Name used in logs
    const LABEL: &'static str;

    fn is_valid(&self) -> bool;

    /// Line-grammar fallback when the text is not JSON
    fn parse_text(text: &str) -> Option<Vec<Self>>;
}

impl StructuredItem for QuizItem
{   const LABEL: &'static str = "quiz";

    fn is_valid(&self) -> bool
    {   QuizItem::is_valid(self)
    }

    fn parse_text(text: &str) -> Option<Vec<Self>>
    {   parse_quiz(text)
    }
}

impl StructuredItem for FlashcardItem
{   const LABEL: &'static str = "flashcards";

    fn is_valid(&self) -> bool
    {   FlashcardItem::is_valid(self)
    }

    fn parse_text(text: &str) -> Option<Vec<Self>>
    {   parse_flashcards(text)
    }
}

/// Parse a JSON array of items, dropping invalid ones.
/// `None` when the text is not such an array or nothing survives.
pub fn parse_json_items<T: StructuredItem>(text: &str) -> Option<Vec<T>>
{   let parsed: Vec<T> = match serde_json::from_str(text.trim())
    {   Ok(items) => items
      , Err(e) => {
          trace!("{} output is not a JSON item array: {}", T::LABEL, e);
          return None;
        }
    };
    let items: Vec<T> = parsed.into_iter().filter(T::is_valid).collect();
    if items.is_empty() { None } else { Some(items) }
}

/// JSON first, then the line grammar
pub fn resolve_items<T: StructuredItem>(text: &str) -> Option<Vec<T>>
{   parse_json_items(text).or_else(|| T::parse_text(text))
}

/// Remove an echoed instruction prompt from model output.
///
/// Whitespace runs compare equal to a single space. When the
/// output starts with the prompt, the matching prefix is cut from
/// the original text and leading `:`, quotes and whitespace are
/// trimmed. Otherwise the output is only trimmed.
pub fn strip_echoed_prompt(output: &str, prompt: Option<&str>) -> String
{   let prompt = match prompt
    {   Some(p) if !p.trim().is_empty() => p
      , _ => return output.trim().to_string()
    };
    match strip_prefix_loose(output, prompt)
    {   Some(rest) => rest
          .trim_start_matches(|c: char| {
            c == ':' || c == '"' || c == '\'' || c.is_whitespace()
          })
          .trim()
          .to_string()
      , None => output.trim().to_string()
    }
}

fn strip_prefix_loose<'a>(output: &'a str, prompt: &str) -> Option<&'a str>
{   let mut rest = output.trim_start();
    let mut words = prompt.split_whitespace().peekable();
    while let Some(word) = words.next()
    {   rest = rest.strip_prefix(word)?;
        if words.peek().is_some()
        {   let trimmed = rest.trim_start();
            if trimmed.len() == rest.len()
            {   return None;
            }
            rest = trimmed;
        }
    }
    Some(rest)
}
