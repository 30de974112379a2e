//! Configuration for providers and model selection
//!
//! Built once at startup and never mutated; the generator and
//! the HTTP clients take it by value or behind an `Arc`.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub const HF_API_BASE: &str
  = "https://api-inference.huggingface.co/models";
pub const GEMINI_API_BASE: &str
  = "https://generativelanguage.googleapis.com/v1beta2/models";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Summarization defaults, tried after any configured model
pub const SUMMARY_MODELS: &[&str] = &[
    "facebook/bart-large-cnn"
  , "google/flan-t5-large"
];

/// Instruction-following defaults for quiz and flashcards.
/// Limited to models that stay published on the inference API.
pub const INSTRUCT_MODELS: &[&str] = &[
    "google/flan-t5-large"
  , "sshleifer/distilbart-cnn-12-6"
  , "facebook/bart-large-cnn"
];

pub const QA_MODELS: &[&str] = &["deepset/roberta-base-squad2"];

pub const GEMINI_MODELS: &[&str] = &["gemini-1.5-flash"];

/// Sampling used for every Gemini fallback call
pub const GEMINI_MAX_OUTPUT_TOKENS: u32 = 600;
pub const GEMINI_TEMPERATURE: f32 = 0.7;

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// Credential; the provider is disabled without one
    #[serde(default)]
    pub api_key: Option<String>
  , /// API base URL
    pub api_base: String
  , /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>
}

impl ProviderConfig
{   pub fn new(api_base: &str) -> Self
    {   ProviderConfig
        {   api_key: None
          , api_base: api_base.to_string()
          , timeout_secs: None
        }
    }

    /// Key if present and not blank
    pub fn api_key(&self) -> Option<&str>
    {   self.api_key.as_deref()
          .map(str::trim)
          .filter(|k| !k.is_empty())
    }

    pub fn is_enabled(&self) -> bool
    {   self.api_key().is_some()
    }

    pub fn timeout_secs(&self) -> u64
    {   self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}

/// Model overrides; `None` means defaults only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig
{   #[serde(default)]
    pub summary_model: Option<String>
  , #[serde(default)]
    pub summary_fallback: Option<String>
  , #[serde(default)]
    pub instruct_model: Option<String>
  , #[serde(default)]
    pub qa_model: Option<String>
  , #[serde(default)]
    pub gemini_model: Option<String>
}

/// Learnova configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnovaConfig
{   /// Primary provider
    pub hugging_face: ProviderConfig
  , /// Secondary, last-resort provider
    pub gemini: ProviderConfig
  , #[serde(default)]
    pub models: ModelConfig
}

impl Default for LearnovaConfig
{   fn default() -> Self
    {   LearnovaConfig
        {   hugging_face: ProviderConfig::new(HF_API_BASE)
          , gemini: ProviderConfig::new(GEMINI_API_BASE)
          , models: ModelConfig::default()
        }
    }
}

impl LearnovaConfig
{   /// Read configuration from the process environment
    pub fn from_env() -> Self
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from any variable lookup.
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String>
    {   let get = |name: &str| {
          lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        };

        let timeout_secs = get("LEARNOVA_TIMEOUT_SECS")
          .and_then(|v| match v.parse::<u64>()
          {   Ok(secs) => Some(secs)
            , Err(_) => {
                warn!("Ignoring invalid LEARNOVA_TIMEOUT_SECS: {}", v);
                None
              }
          });

        let shared_model = get("HF_MODEL");

        let config = LearnovaConfig
        {   hugging_face: ProviderConfig
            {   api_key: get("HF_API_KEY")
              , api_base: get("HF_API_BASE")
                  .unwrap_or_else(|| HF_API_BASE.to_string())
              , timeout_secs
            }
          , gemini: ProviderConfig
            {   api_key: get("GEMINI_API_KEY")
              , api_base: get("GEMINI_API_BASE")
                  .unwrap_or_else(|| GEMINI_API_BASE.to_string())
              , timeout_secs
            }
          , models: ModelConfig
            {   summary_model: get("HF_SUMMARY_MODEL")
                  .or_else(|| shared_model.clone())
              , summary_fallback: get("HF_SUMMARY_FALLBACK")
              , instruct_model: get("HF_INSTRUCT_MODEL")
                  .or_else(|| shared_model.clone())
              , qa_model: get("HF_QA_MODEL")
              , gemini_model: get("GEMINI_MODEL")
            }
        };

        debug!(
          "Loaded config: huggingface={} gemini={}",
          config.hugging_face.is_enabled(),
          config.gemini.is_enabled()
        );
        config
    }

    /// Parse configuration from JSON
    pub fn from_json_str(json: &str)
      -> Result<Self, crate::error::Error>
    {   serde_json::from_str(json).map_err(|e| {
          crate::error::Error::Configuration(
            format!("invalid config JSON: {}", e)
          )
        })
    }

    pub fn provider(&self, provider: crate::Provider)
      -> &ProviderConfig
    {   match provider
        {   crate::Provider::HuggingFace => &self.hugging_face
          , crate::Provider::Gemini => &self.gemini
        }
    }

    pub fn is_configured(&self, provider: crate::Provider) -> bool
    {   self.provider(provider).is_enabled()
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)])
      -> impl Fn(&str) -> Option<String>
    {   let map: HashMap<String, String> = pairs
          .iter()
          .map(|(k, v)| (k.to_string(), v.to_string()))
          .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_empty_environment_uses_defaults()
    {   let config = LearnovaConfig::from_lookup(lookup(&[]));
        assert_eq!(config, LearnovaConfig::default());
        assert!(!config.is_configured(crate::Provider::HuggingFace));
        assert!(!config.is_configured(crate::Provider::Gemini));
    }

    #[test]
    fn test_hf_model_feeds_summary_and_instruct()
    {   let config = LearnovaConfig::from_lookup(lookup(&[
          ("HF_API_KEY", "hf-key")
        , ("HF_MODEL", "org/shared")
        , ("HF_INSTRUCT_MODEL", "org/instruct")
        ]));
        assert_eq!(
          config.models.summary_model.as_deref(),
          Some("org/shared")
        );
        assert_eq!(
          config.models.instruct_model.as_deref(),
          Some("org/instruct")
        );
        assert!(config.is_configured(crate::Provider::HuggingFace));
    }

    #[test]
    fn test_blank_values_are_unset()
    {   let config = LearnovaConfig::from_lookup(lookup(&[
          ("GEMINI_API_KEY", "   ")
        , ("HF_SUMMARY_MODEL", "")
        ]));
        assert!(!config.gemini.is_enabled());
        assert!(config.models.summary_model.is_none());
    }

    #[test]
    fn test_timeout_parsing()
    {   let config = LearnovaConfig::from_lookup(lookup(&[
          ("LEARNOVA_TIMEOUT_SECS", "12")
        ]));
        assert_eq!(config.hugging_face.timeout_secs(), 12);
        assert_eq!(config.gemini.timeout_secs(), 12);

        let config = LearnovaConfig::from_lookup(lookup(&[
          ("LEARNOVA_TIMEOUT_SECS", "soon")
        ]));
        assert_eq!(
          config.hugging_face.timeout_secs(),
          DEFAULT_TIMEOUT_SECS
        );
    }

    #[test]
    fn test_json_config()
    {   let config = LearnovaConfig::from_json_str(r#"{
          "hugging_face": { "api_key": "k", "api_base": "http://hf" },
          "gemini": { "api_base": "http://gm" }
        }"#).unwrap();
        assert_eq!(config.hugging_face.api_key(), Some("k"));
        assert_eq!(config.gemini.api_base, "http://gm");
        assert_eq!(config.models, ModelConfig::default());

        let err = LearnovaConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, crate::error::Error::Configuration(_)));
    }
}
