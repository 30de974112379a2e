use log::{debug, error, trace};
use serde::Serialize;
use serde_json::Value;

use crate::request::Payload;

// ===== Request Types =====

#[derive(Debug, Clone, Serialize)]
pub struct GeminiPrompt
{   pub text: String
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest
{   pub prompt: GeminiPrompt
  , pub temperature: f32
  , pub max_output_tokens: u32
}

impl GeminiRequest
{   pub fn from_payload(payload: &Payload) -> Self
    {   GeminiRequest
        {   prompt: GeminiPrompt { text: payload.prompt_text() }
          , temperature: payload.temperature
          , max_output_tokens: payload.max_tokens
        }
    }
}

/// `candidates[0].content`, then `output[0].content`
pub fn extract_content(data: &Value) -> Option<&str>
{   ["candidates", "output"]
      .iter()
      .filter_map(|field| {
        data.get(*field)?
          .get(0)?
          .get("content")?
          .as_str()
      })
      .next()
}

// ===== Gemini Client =====

/// Single-attempt client for the Generative Language API
#[derive(Debug, Clone)]
pub struct GeminiClient
{   api_key: String
  , api_base: String
  , http_client: reqwest::Client
}

impl GeminiClient
{   pub fn new(
      api_key: String
    , api_base: String
    , http_client: reqwest::Client
    ) -> Self
    {   debug!("Creating GeminiClient for {}", api_base);
        GeminiClient
        {   api_key
          , api_base: api_base.trim_end_matches('/').to_string()
          , http_client
        }
    }

    pub fn model_url(&self, model: &str) -> String
    {   format!("{}/{}:generateText", self.api_base, model)
    }

    /// POST the payload to one model. Known response shapes are
    /// reduced to their text; anything else is returned as is
    /// for the normalizer.
    pub async fn call(
      &self
    , model: &str
    , payload: &Payload
    ) -> Result<Value, crate::error::Error>
    {   let request = GeminiRequest::from_payload(payload);
        trace!("Gemini request to {}: {:?}", model, request);

        let response = self.http_client
          .post(self.model_url(model))
          .query(&[("key", self.api_key.as_str())])
          .header("Content-Type", "application/json")
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            // reqwest errors carry the URL, which carries the key
            let e = e.without_url();
            error!("HTTP error calling {}: {}", model, e);
            crate::error::Error::HttpError(e.to_string())
          })?;

        let status = response.status();
        trace!("Gemini response status for {}: {}", model, status);

        if !status.is_success()
        {   let body = response.text().await
              .unwrap_or_default();
            return Err(crate::error::Error::Provider
            {   status: status.as_u16()
              , status_text: status.canonical_reason()
                  .unwrap_or("")
                  .to_string()
              , provider: crate::Provider::Gemini
              , model: model.to_string()
              , body
            });
        }

        let data = response.json::<Value>().await.map_err(|e| {
          error!("Parse error from {}: {}", model, e.without_url());
          crate::error::Error::ParseError(
            format!("undecodable Gemini response from {}", model)
          )
        })?;

        Ok(match extract_content(&data)
        {   Some(content) => Value::String(content.to_string())
          , None => {
              debug!("Gemini response without content field");
              data
            }
        })
    }
}
