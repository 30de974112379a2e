//! Text-generation provider clients

pub mod gemini;
pub mod huggingface;

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use serde_json::Value;

pub use gemini::GeminiClient;
pub use huggingface::HuggingFaceClient;

use crate::request::Payload;

/// One authenticated request to one model. No retries; the
/// fallback loop decides what happens after a failure.
#[async_trait]
pub trait ModelProvider: Send + Sync
{   async fn call(
      &self
    , provider: crate::Provider
    , model: &str
    , payload: &Payload
    ) -> Result<Value, crate::error::Error>;

    /// Whether a credential exists for this provider family
    fn is_configured(&self, provider: crate::Provider) -> bool;
}

/// Routes calls to the HTTP client of each configured provider
#[derive(Debug, Clone)]
pub struct HttpProvider
{   hugging_face: Option<HuggingFaceClient>
  , gemini: Option<GeminiClient>
}

impl HttpProvider
{   /// Build clients for every provider with a credential.
    /// Each client gets the provider's configured timeout.
    pub fn new(config: &crate::config::LearnovaConfig)
      -> Result<Self, crate::error::Error>
    {   let hugging_face = match config.hugging_face.api_key()
        {   Some(key) => Some(HuggingFaceClient::new(
              key.to_string()
            , config.hugging_face.api_base.clone()
            , http_client(config.hugging_face.timeout_secs())?
            ))
          , None => {
              debug!("HF_API_KEY not configured");
              None
            }
        };

        let gemini = match config.gemini.api_key()
        {   Some(key) => Some(GeminiClient::new(
              key.to_string()
            , config.gemini.api_base.clone()
            , http_client(config.gemini.timeout_secs())?
            ))
          , None => {
              debug!("GEMINI_API_KEY not configured");
              None
            }
        };

        Ok(HttpProvider { hugging_face, gemini })
    }
}

fn http_client(timeout_secs: u64)
  -> Result<reqwest::Client, crate::error::Error>
{   reqwest::Client::builder()
      .timeout(Duration::from_secs(timeout_secs))
      .build()
      .map_err(|e| {
        error!("Failed to build HTTP client: {}", e);
        crate::error::Error::Configuration(e.to_string())
      })
}

fn not_configured(provider: crate::Provider) -> crate::error::Error
{   crate::error::Error::Configuration(
      format!("{} not configured", provider.key_var())
    )
}

#[async_trait]
impl ModelProvider for HttpProvider
{   async fn call(
      &self
    , provider: crate::Provider
    , model: &str
    , payload: &Payload
    ) -> Result<Value, crate::error::Error>
    {   match provider
        {   crate::Provider::HuggingFace => match &self.hugging_face
            {   Some(client) => client.call(model, payload).await
              , None => Err(not_configured(provider))
            }
          , crate::Provider::Gemini => match &self.gemini
            {   Some(client) => client.call(model, payload).await
              , None => Err(not_configured(provider))
            }
        }
    }

    fn is_configured(&self, provider: crate::Provider) -> bool
    {   match provider
        {   crate::Provider::HuggingFace => self.hugging_face.is_some()
          , crate::Provider::Gemini => self.gemini.is_some()
        }
    }
}
