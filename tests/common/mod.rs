//! Scripted in-memory provider shared by the integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use learnova::config::LearnovaConfig;
use learnova::providers::ModelProvider;
use learnova::request::Payload;
use learnova::{Error, Generator, Provider};

/// One recorded provider call
#[derive(Debug, Clone)]
pub struct Call
{   pub provider: Provider
  , pub model: String
  , pub payload: Payload
}

/// Answers from a per-model queue; unscripted models answer 404
#[derive(Default)]
pub struct ScriptedProvider
{   responses: Mutex<HashMap<(Provider, String), VecDeque<Result<Value, Error>>>>
  , calls: Mutex<Vec<Call>>
  , configured: Vec<Provider>
}

impl ScriptedProvider
{   pub fn new(configured: &[Provider]) -> Self
    {   ScriptedProvider
        {   configured: configured.to_vec()
          , ..Default::default()
        }
    }

    pub fn respond(
      self
    , provider: Provider
    , model: &str
    , result: Result<Value, Error>
    ) -> Self
    {   self.responses
          .lock()
          .unwrap()
          .entry((provider, model.to_string()))
          .or_default()
          .push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<Call>
    {   self.calls.lock().unwrap().clone()
    }
}

pub fn provider_error(provider: Provider, model: &str, status: u16) -> Error
{   Error::Provider
    {   status
      , status_text: "scripted".to_string()
      , provider
      , model: model.to_string()
      , body: String::new()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider
{   async fn call(
      &self
    , provider: Provider
    , model: &str
    , payload: &Payload
    ) -> Result<Value, Error>
    {   self.calls.lock().unwrap().push(Call
        {   provider
          , model: model.to_string()
          , payload: payload.clone()
        });
        let next = self.responses
          .lock()
          .unwrap()
          .get_mut(&(provider, model.to_string()))
          .and_then(|queue| queue.pop_front());
        next.unwrap_or_else(|| Err(provider_error(provider, model, 404)))
    }

    fn is_configured(&self, provider: Provider) -> bool
    {   self.configured.contains(&provider)
    }
}

/// Generator over a scripted provider, keeping a handle to it
pub fn generator(
  config: LearnovaConfig
, provider: ScriptedProvider
) -> (Generator, Arc<ScriptedProvider>)
{   let provider = Arc::new(provider);
    let shared: Arc<dyn ModelProvider> = provider.clone();
    (Generator::with_provider(config, shared), provider)
}

pub fn init_logging()
{   let _ = env_logger::builder().is_test(true).try_init();
}
