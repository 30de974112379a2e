//! Link and email redaction for model input
//!
//! Links left in the prompt tend to come back as invented links
//! in generated output, so they are replaced before any prompt
//! is built.

use std::sync::OnceLock;

use regex::Regex;

pub const LINK_PLACEHOLDER: &str = "[LINK]";
pub const EMAIL_PLACEHOLDER: &str = "[EMAIL]";

struct Patterns
{   url: Regex
  , www: Regex
  , email: Regex
}

fn patterns() -> &'static Patterns
{   static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns
    {   url: Regex::new(r"(?i)https?://\S+")
          .expect("valid url pattern")
      , www: Regex::new(r"(?i)www\.\S+")
          .expect("valid www pattern")
      , email: Regex::new(r"[\w.-]+@[\w.-]+\.[A-Za-z]{2,6}")
          .expect("valid email pattern")
    })
}

/// Replace URLs and `www.` tokens with `[LINK]`, then emails
/// with `[EMAIL]`. Running it again on its output changes nothing.
pub fn redact(text: &str) -> String
{   if text.is_empty()
    {   return String::new();
    }
    let p = patterns();
    let out = p.url.replace_all(text, LINK_PLACEHOLDER);
    let out = p.www.replace_all(&out, LINK_PLACEHOLDER);
    p.email.replace_all(&out, EMAIL_PLACEHOLDER).into_owned()
}
