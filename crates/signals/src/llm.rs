// In crates/signals/src/llm.rs

//! AI signal provider backed by an OpenAI-compatible chat-completions API.

use crate::decision::parse_decision;
use crate::{Error, Result, SignalProvider};
use app_config::types::SignalProviderSettings;
use async_trait::async_trait;
use chrono::Utc;
use core_types::{MarketSnapshot, Symbol, TradingDecision};
use serde::{Deserialize, Serialize};

const SYSTEM_PROMPT: &str = "You are an expert cryptocurrency futures trader. \
Analyze the market data and decide whether to BUY, SELL, CLOSE or HOLD. \
Always respond with valid JSON only, no markdown formatting.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

pub struct LlmSignalProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmSignalProvider {
    pub fn new(settings: &SignalProviderSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }

    fn create_prompt(symbol: &Symbol, snapshot: &MarketSnapshot) -> String {
        format!(
            "Analyze {symbol} perpetual futures.\n\
             Current price: {price}\n\
             24h change: {change:.2}%\n\
             24h volume: {volume}\n\
             24h high: {high}\n\
             24h low: {low}\n\n\
             Respond with a JSON object of this exact shape:\n\
             {{\"action\": \"BUY\" | \"SELL\" | \"CLOSE\" | \"HOLD\",\n\
               \"confidence\": number between 0 and 1,\n\
               \"reasoning\": string,\n\
               \"technicalIndicators\": {{\"rsi\": number, \"trend\": \"BULLISH\" | \"BEARISH\" | \"NEUTRAL\", \"support\": number, \"resistance\": number}},\n\
               \"riskAssessment\": {{\"volatility\": \"HIGH\" | \"MEDIUM\" | \"LOW\", \"stopLoss\": number, \"takeProfit\": number, \"recommendedLeverage\": integer}}}}",
            symbol = symbol,
            price = snapshot.price,
            change = snapshot.change_24h,
            volume = snapshot.volume_24h,
            high = snapshot.high_24h,
            low = snapshot.low_24h,
        )
    }

    async fn complete(&self, prompt: String) -> Result<Option<String>> {
        let request = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ApiError { status, body });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::InvalidResponse("no choices in completion".into()))?
            .message
            .content
            .filter(|c| !c.trim().is_empty() && c.trim() != "null");

        Ok(content)
    }
}

#[async_trait]
impl SignalProvider for LlmSignalProvider {
    fn name(&self) -> &str {
        &self.model
    }

    async fn test_connection(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Signal provider rejected the connectivity check.");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Signal provider is unreachable.");
                false
            }
        }
    }

    async fn analyze(
        &self,
        symbol: &Symbol,
        snapshot: &MarketSnapshot,
    ) -> Result<Option<TradingDecision>> {
        let prompt = Self::create_prompt(symbol, snapshot);

        let Some(content) = self.complete(prompt).await? else {
            tracing::debug!(symbol = %symbol, "Signal provider returned an empty answer.");
            return Ok(None);
        };

        let decision = parse_decision(symbol, &content, snapshot.price, &self.model, Utc::now())?;
        Ok(Some(decision))
    }
}
