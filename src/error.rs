use std::fmt;

/// Custom error type for Learnova operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Credential or model list missing for a provider family
    Configuration(String)
  , /// Provider answered with a non-success status
    Provider
    {   status: u16
      , status_text: String
      , provider: crate::Provider
      , model: String
      , body: String
    }
  , /// Every candidate failed; carries the last failure
    AllCandidatesExhausted
    {   attempted: usize
      , last: Box<Error>
    }
  , /// Caller input rejected before any provider call
    InvalidInput(String)
  , /// Transport error (connect, timeout, TLS)
    HttpError(String)
  , /// Failed to decode a provider response
    ParseError(String)
  , /// Generic error
    Other(String)
}

/// Coarse classification of a failure, used by the fallback
/// loop for logging. Every kind still advances to the next
/// candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind
{   NotFound
  , RateLimited
  , Unauthorized
  , Unavailable
  , Configuration
  , Transport
  , Other
}

impl Error
{   /// Classify this error for the fallback loop
    pub fn kind(&self) -> FailureKind
    {   match self
        {   Error::Provider { status, .. } => match *status
            {   404 | 410 => FailureKind::NotFound
              , 429 => FailureKind::RateLimited
              , 401 | 403 => FailureKind::Unauthorized
              , 500..=599 => FailureKind::Unavailable
              , _ => FailureKind::Other
            }
          , Error::Configuration(_) => FailureKind::Configuration
          , Error::HttpError(_) => FailureKind::Transport
          , Error::AllCandidatesExhausted { last, .. } => last.kind()
          , _ => FailureKind::Other
        }
    }

    /// True when the model or resource does not exist
    pub fn is_not_found(&self) -> bool
    {   self.kind() == FailureKind::NotFound
    }

    /// Low-detail message safe to show to end users.
    /// Model names, statuses and bodies stay in the logs.
    pub fn public_message(&self) -> &'static str
    {   match self
        {   Error::InvalidInput(_) => "invalid input"
          , Error::Configuration(_) => "generation service not configured"
          , Error::AllCandidatesExhausted { .. }
          | Error::Provider { .. }
          | Error::HttpError(_) => "generation provider unavailable"
          , Error::ParseError(_) => "unreadable provider response"
          , Error::Other(_) => "generation failed"
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::Configuration(msg) => {
              write!(f, "Configuration error: {}", msg)
            }
          , Error::Provider
            {   status, status_text, provider, model, body
            } => {
              write!(f,
                "{} {} {} - model={} - {}",
                provider, status, status_text, model, body
              )
            }
          , Error::AllCandidatesExhausted { attempted, last } => {
              write!(f,
                "All {} candidates failed, last error: {}",
                attempted, last
              )
            }
          , Error::InvalidInput(msg) => {
              write!(f, "Invalid input: {}", msg)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
