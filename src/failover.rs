//! Candidate lists and the sequential fallback loop
//!
//! Fallback here is across different models, not retries of the
//! same one: a single pass in priority order, no delay between
//! attempts, first success wins.

use log::{debug, warn};
use serde_json::Value;

use crate::error::{Error, FailureKind};
use crate::providers::ModelProvider;
use crate::request::Payload;

/// One (provider, model) pair to try
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate
{   pub provider: crate::Provider
  , pub model: String
}

impl Candidate
{   pub fn new(provider: crate::Provider, model: impl Into<String>) -> Self
    {   Candidate
        {   provider
          , model: model.into()
        }
    }
}

impl std::fmt::Display for Candidate
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   write!(f, "{}:{}", self.provider, self.model)
    }
}

/// Ordered, duplicate-free candidates for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateList
{   candidates: Vec<Candidate>
}

impl CandidateList
{   /// Configured models first, then the fixed defaults.
    /// Blank and repeated entries are skipped.
    pub fn build<'a, I>(
      provider: crate::Provider
    , configured: I
    , defaults: &[&str]
    ) -> Self
    where I: IntoIterator<Item = Option<&'a str>>
    {   let mut list = CandidateList::default();
        for model in configured.into_iter().flatten()
        {   list.push(Candidate::new(provider, model));
        }
        for model in defaults
        {   list.push(Candidate::new(provider, *model));
        }
        debug!(
          "Built candidate list with {} entries: {:?}",
          list.len(),
          list.models()
        );
        list
    }

    /// Append unless blank or already present
    pub fn push(&mut self, candidate: Candidate)
    {   let model = candidate.model.trim();
        if model.is_empty()
        {   return;
        }
        let candidate = Candidate::new(candidate.provider, model);
        if !self.candidates.contains(&candidate)
        {   self.candidates.push(candidate);
        }
    }

    pub fn first(&self) -> Option<&Candidate>
    {   self.candidates.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate>
    {   self.candidates.iter()
    }

    pub fn len(&self) -> usize
    {   self.candidates.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.candidates.is_empty()
    }

    pub fn models(&self) -> Vec<&str>
    {   self.candidates.iter().map(|c| c.model.as_str()).collect()
    }
}

/// Successful attempt and the candidate that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt
{   pub response: Value
  , pub used: Candidate
}

/// Call each candidate in order until one succeeds.
///
/// Every failure kind moves on to the next candidate; the kinds
/// only change what gets logged. Fails with
/// `AllCandidatesExhausted` wrapping the last error.
pub async fn try_in_order(
  provider: &dyn ModelProvider
, candidates: &CandidateList
, payload: &Payload
) -> Result<Attempt, Error>
{   if candidates.is_empty()
    {   return Err(Error::Configuration(
          "no candidate models".to_string()
        ));
    }

    let mut last_error = None;
    for candidate in candidates.iter()
    {   debug!("Trying model: {}", candidate);
        match provider
          .call(candidate.provider, &candidate.model, payload)
          .await
        {   Ok(response) => {
              debug!("Model {} succeeded", candidate);
              return Ok(Attempt
              {   response
                , used: candidate.clone()
              });
            }
          , Err(e) => {
              match e.kind()
              {   FailureKind::NotFound => warn!(
                    "Model {} not found, trying next fallback: {}",
                    candidate, e
                  )
                , FailureKind::Configuration => warn!(
                    "Model {} unavailable, provider not configured: {}",
                    candidate, e
                  )
                , kind => warn!(
                    "Model {} failed ({:?}), trying next fallback: {}",
                    candidate, kind, e
                  )
              }
              last_error = Some(e);
            }
        }
    }

    Err(Error::AllCandidatesExhausted
    {   attempted: candidates.len()
      , last: Box::new(last_error.unwrap_or_else(|| {
          Error::Other("all model attempts failed".to_string())
        }))
    })
}
