use log::{debug, error, trace};
use serde::Serialize;
use serde_json::Value;

use crate::request::{Payload, PayloadInput};

// ===== Request Types =====

#[derive(Debug, Clone, Serialize)]
pub struct HfRequest<'a>
{   pub inputs: HfInputs<'a>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<HfParameters>
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum HfInputs<'a>
{   Text(&'a str)
  , Question
    {   question: &'a str
      , context: &'a str
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HfParameters
{   pub max_new_tokens: u32
  , pub temperature: f32
}

impl<'a> HfRequest<'a>
{   /// Text payloads carry generation parameters; question
    /// payloads go to extractive models that take none.
    pub fn from_payload(payload: &'a Payload) -> Self
    {   match &payload.input
        {   PayloadInput::Text(text) => HfRequest
            {   inputs: HfInputs::Text(text.as_str())
              , parameters: Some(HfParameters
                {   max_new_tokens: payload.max_tokens
                  , temperature: payload.temperature
                })
            }
          , PayloadInput::Question { question, context } => HfRequest
            {   inputs: HfInputs::Question
                {   question: question.as_str()
                  , context: context.as_str()
                }
              , parameters: None
            }
        }
    }
}

// ===== Hugging Face Client =====

/// Single-attempt client for the Hugging Face inference API
#[derive(Debug, Clone)]
pub struct HuggingFaceClient
{   api_key: String
  , api_base: String
  , http_client: reqwest::Client
}

impl HuggingFaceClient
{   pub fn new(
      api_key: String
    , api_base: String
    , http_client: reqwest::Client
    ) -> Self
    {   debug!("Creating HuggingFaceClient for {}", api_base);
        HuggingFaceClient
        {   api_key
          , api_base: api_base.trim_end_matches('/').to_string()
          , http_client
        }
    }

    pub fn model_url(&self, model: &str) -> String
    {   format!("{}/{}", self.api_base, model)
    }

    /// POST the payload to one model. Non-2xx responses become
    /// `Error::Provider` with the body kept for diagnostics.
    pub async fn call(
      &self
    , model: &str
    , payload: &Payload
    ) -> Result<Value, crate::error::Error>
    {   let request = HfRequest::from_payload(payload);
        trace!("HF request to {}: {:?}", model, request);

        let response = self.http_client
          .post(self.model_url(model))
          .header("Authorization", format!("Bearer {}", self.api_key))
          .header("Content-Type", "application/json")
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error calling {}: {}", model, e);
            crate::error::Error::HttpError(e.to_string())
          })?;

        let status = response.status();
        trace!("HF response status for {}: {}", model, status);

        if !status.is_success()
        {   let body = response.text().await
              .unwrap_or_default();
            return Err(crate::error::Error::Provider
            {   status: status.as_u16()
              , status_text: status.canonical_reason()
                  .unwrap_or("")
                  .to_string()
              , provider: crate::Provider::HuggingFace
              , model: model.to_string()
              , body
            });
        }

        response.json::<Value>().await.map_err(|e| {
          error!("Parse error from {}: {}", model, e);
          crate::error::Error::ParseError(e.to_string())
        })
    }
}
