// Ollama Intent Classifier Adapter
//
// Anti-Corruption Layer for a local Ollama model acting as the intent
// classifier. The model is prompted to answer with strict JSON only;
// anything else is a Malformed classification, never a crash.

use crate::domain::config::ClassifierConfig;
use crate::domain::intent::{ClassifierError, IntentCall, IntentClassifier};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Instruction prompt enumerating the intents the model may emit.
/// Function and parameter names are the wire contract with the dispatcher.
const SYSTEM_PROMPT: &str = r#"You are the JSON orchestrator of a telecom operator.
Classify the user's intention into exactly one of the functions below.

CRITICAL RULES:
1. Answer ONLY with valid JSON.
2. Use ONLY the exact function names listed below. Do not translate. Do not invent.
3. When the user wants to activate a plan, always use "ativar_plano".

ALLOWED FUNCTIONS:

1. setup_telco
   - Triggers: "start the system", "set up", "configure".
   - Params: {}

2. conectar_cliente
   - Triggers: "connect a client", "new subscriber", "onboarding".
   - Params: {}

3. ativar_plano
   - Triggers: "activate a plan", "sell a promotion", "I want 50GB".
   - Params:
     - "nome_plano": (string) e.g. "Turbo 5G".
     - "franquia": (string) e.g. "50GB".

4. verificar_acesso
   - Triggers: "verify access", "validate the plan".
   - Params: {}

Example of correct output:
{
  "function_name": "ativar_plano",
  "parameters": {
    "nome_plano": "Turbo 5G",
    "franquia": "500GB"
  }
}
"#;

pub struct OllamaClassifier {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    format: &'a str,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    // Zero temperature: classification has to be deterministic.
    temperature: f32,
    // Short ceiling keeps a rambling model from producing junk after
    // the JSON object.
    num_predict: i32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OllamaClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl IntentClassifier for OllamaClassifier {
    async fn classify(&self, utterance: &str) -> Result<IntentCall, ClassifierError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: utterance,
                },
            ],
            stream: false,
            format: "json",
            options: ChatOptions {
                temperature: 0.0,
                num_predict: 128,
            },
        };

        let url = format!("{}/api/chat", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|err| ClassifierError::Network(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Provider(format!("HTTP {status}: {detail}")));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|err| ClassifierError::Malformed(err.to_string()))?;

        serde_json::from_str(&chat.message.content).map_err(|err| {
            ClassifierError::Malformed(format!(
                "model did not return the expected JSON shape: {err}"
            ))
        })
    }

    async fn health_check(&self) -> Result<(), ClassifierError> {
        let url = format!("{}/api/tags", self.endpoint);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| ClassifierError::Network(err.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClassifierError::Network(format!(
                "HTTP {}",
                response.status()
            )))
        }
    }
}
