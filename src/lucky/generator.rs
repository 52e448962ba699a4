//! Lucky number suggestions with a local fallback draw.
//!
//! The AI path is advisory: any failure is logged and answered with a
//! uniformly random set of unique numbers, so callers never see an error.

use super::client::{GeminiClient, TextGenerator, TextRequest};
use crate::config::{BolaoConfig, RangePolicy};
use crate::errors::GenerationError;
use crate::games::{find_game, game_or_default};
use crate::pools::Pool;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Shown when the rules explanation cannot be generated
pub const RULES_UNAVAILABLE: &str = "Informações sobre as regras não disponíveis no momento.";

const LEGACY_MEGA_SENA_MAX: u32 = 60;
const LEGACY_DEFAULT_MAX: u32 = 25;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NumberSource {
    Ai,
    Fallback,
}

/// Suggested numbers and where they came from
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LuckyNumbers {
    pub numbers: Vec<u32>,
    pub source: NumberSource,
}

#[derive(Deserialize)]
struct NumbersReply {
    numbers: Vec<u32>,
}

/// Parse a `{ "numbers": [..] }` reply
pub fn parse_numbers(text: &str) -> Result<Vec<u32>, GenerationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    let reply: NumbersReply = serde_json::from_str(text)?;
    Ok(reply.numbers)
}

/// `count` unique numbers from 1..=max, ascending.
///
/// A count larger than the range is clamped to the range size.
pub fn draw_unique<R: Rng + ?Sized>(rng: &mut R, max: u32, count: usize) -> Vec<u32> {
    let range = max as usize;
    let count = if count > range {
        warn!(count, max, "Requested more numbers than the range holds; clamping");
        range
    } else {
        count
    };

    let mut numbers: Vec<u32> = rand::seq::index::sample(rng, range, count)
        .into_iter()
        .map(|index| index as u32 + 1)
        .collect();
    numbers.sort_unstable();
    numbers
}

fn numbers_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "numbers": {
                "type": "ARRAY",
                "items": { "type": "INTEGER" }
            }
        },
        "required": ["numbers"]
    })
}

fn lucky_prompt(game_type: &str, count: usize) -> String {
    format!(
        "Gere {} números da sorte para um jogo de {} da loteria brasileira. Retorne apenas os números separados por vírgula.",
        count, game_type
    )
}

fn rules_prompt(game_type: &str) -> String {
    format!(
        "Explique brevemente as regras básicas e como funciona o prêmio do jogo {} da Caixa Econômica Federal. Seja direto e use português brasileiro.",
        game_type
    )
}

/// Suggests numbers for a game, via AI when available
pub struct LuckyNumberGenerator {
    client: Arc<dyn TextGenerator>,
    range_policy: RangePolicy,
    default_count: usize,
    temperature: f32,
}

impl LuckyNumberGenerator {
    /// Generator over `client`, with draw settings and temperature from `config`
    pub fn new(client: Arc<dyn TextGenerator>, config: &BolaoConfig) -> Self {
        Self {
            client,
            range_policy: config.generator.range_policy,
            default_count: config.generator.default_count,
            temperature: config.ai.temperature,
        }
    }

    /// Generator backed by the Gemini client described in `config.ai`
    pub fn from_config(config: &BolaoConfig) -> Self {
        if !config.ai.has_credentials() {
            info!("No AI credentials configured; lucky numbers will use the local draw");
        }
        let client = Arc::new(GeminiClient::new(config.ai.clone()));
        Self::new(client, config)
    }

    /// Suggest `count` numbers for `game_type`; never fails
    pub async fn generate(&self, game_type: &str, count: usize) -> LuckyNumbers {
        match self.request_numbers(game_type, count).await {
            Ok(numbers) => LuckyNumbers {
                numbers,
                source: NumberSource::Ai,
            },
            Err(e) => {
                warn!(game_type, count, error = %e, "AI lucky numbers unavailable, using local draw");
                self.fallback(game_type, count)
            }
        }
    }

    /// Suggest numbers for a pool, sized by its game's pick count
    pub async fn generate_for_pool(&self, pool: &Pool) -> LuckyNumbers {
        let count = find_game(&pool.game_type)
            .map(|game| game.min_numbers as usize)
            .unwrap_or(self.default_count);
        self.generate(&pool.game_type, count).await
    }

    /// Like [`generate`](Self::generate), but yields `None` if `cancel` fires first.
    ///
    /// Dropping the sender does not cancel.
    pub async fn generate_cancellable(
        &self,
        game_type: &str,
        count: usize,
        cancel: oneshot::Receiver<()>,
    ) -> Option<LuckyNumbers> {
        tokio::select! {
            result = self.generate(game_type, count) => Some(result),
            Ok(()) = cancel => {
                info!(game_type, "Lucky number generation cancelled");
                None
            }
        }
    }

    /// Local draw used whenever the AI path fails
    pub fn fallback(&self, game_type: &str, count: usize) -> LuckyNumbers {
        let max = self.fallback_max(game_type);
        LuckyNumbers {
            numbers: draw_unique(&mut rand::thread_rng(), max, count),
            source: NumberSource::Fallback,
        }
    }

    /// Upper bound of the fallback draw for a game
    pub fn fallback_max(&self, game_type: &str) -> u32 {
        match self.range_policy {
            RangePolicy::Registry => game_or_default(game_type).max_numbers,
            RangePolicy::Legacy if game_type == "mega-sena" => LEGACY_MEGA_SENA_MAX,
            RangePolicy::Legacy => LEGACY_DEFAULT_MAX,
        }
    }

    /// Short rules explanation, or [`RULES_UNAVAILABLE`]
    pub async fn explain_rules(&self, game_type: &str) -> String {
        match self.client.generate_text(&TextRequest::plain(rules_prompt(game_type))).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(game_type, "AI returned an empty rules explanation");
                RULES_UNAVAILABLE.to_string()
            }
            Err(e) => {
                warn!(game_type, error = %e, "AI rules explanation unavailable");
                RULES_UNAVAILABLE.to_string()
            }
        }
    }

    async fn request_numbers(&self, game_type: &str, count: usize) -> Result<Vec<u32>, GenerationError> {
        let request = TextRequest {
            prompt: lucky_prompt(game_type, count),
            response_schema: Some(numbers_schema()),
            temperature: Some(self.temperature),
        };
        let text = self.client.generate_text(&request).await?;
        parse_numbers(&text)
    }
}
