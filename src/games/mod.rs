pub mod registry;

pub use registry::{find_game, game_or_default, LotteryGame, FALLBACK_GAME, LOTTERY_GAMES};
