//! Static registry of the supported official lotteries.

use crate::errors::LookupError;
use serde::Serialize;
use std::fmt;

/// One official lottery and its numeric ranges
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LotteryGame {
    pub id: &'static str,
    pub name: &'static str,
    /// Display accent, carried for front-ends
    pub color: &'static str,
    /// How many numbers a bet picks
    pub min_numbers: u32,
    /// Numbers range over 1..=max_numbers
    pub max_numbers: u32,
}

impl fmt::Display for LotteryGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub const LOTTERY_GAMES: [LotteryGame; 8] = [
    LotteryGame { id: "mega-sena", name: "Mega-Sena", color: "#209869", min_numbers: 6, max_numbers: 60 },
    LotteryGame { id: "lotofacil", name: "Lotofácil", color: "#930089", min_numbers: 15, max_numbers: 25 },
    LotteryGame { id: "quina", name: "Quina", color: "#260085", min_numbers: 5, max_numbers: 80 },
    LotteryGame { id: "lotomania", name: "Lotomania", color: "#f7941d", min_numbers: 50, max_numbers: 50 },
    LotteryGame { id: "dupla-sena", name: "Dupla Sena", color: "#a61324", min_numbers: 6, max_numbers: 50 },
    LotteryGame { id: "dia-de-sorte", name: "Dia de Sorte", color: "#cb9c39", min_numbers: 7, max_numbers: 31 },
    LotteryGame { id: "super-sete", name: "Super Sete", color: "#a1c91c", min_numbers: 7, max_numbers: 70 },
    LotteryGame { id: "timemania", name: "Timemania", color: "#00ff00", min_numbers: 10, max_numbers: 80 },
];

/// Shape used when a game id is not in the registry: 6 numbers out of 25.
pub const FALLBACK_GAME: LotteryGame = LotteryGame {
    id: "unknown",
    name: "Desconhecido",
    color: "#333333",
    min_numbers: 6,
    max_numbers: 25,
};

/// Look up a game by its slug
pub fn find_game(id: &str) -> Result<&'static LotteryGame, LookupError> {
    LOTTERY_GAMES
        .iter()
        .find(|game| game.id == id)
        .ok_or_else(|| LookupError::GameNotFound(id.to_string()))
}

/// Look up a game, substituting [`FALLBACK_GAME`] on a miss
pub fn game_or_default(id: &str) -> &'static LotteryGame {
    match find_game(id) {
        Ok(game) => game,
        Err(e) => {
            tracing::debug!(game_type = id, "{}; using fallback game shape", e);
            &FALLBACK_GAME
        }
    }
}
