//! Bolão - lottery pool coordination
//!
//! Domain model for group lottery pools ("bolões"): a static registry of the
//! official games, pools with quota accounting and a status lifecycle, an
//! in-memory catalog, and AI-suggested lucky numbers with a local fallback.

pub mod catalog;
pub mod config;
pub mod errors;
pub mod games;
pub mod lucky;
pub mod pools;
pub mod services;

pub use catalog::PoolCatalog;
pub use config::{BolaoConfig, ConfigLoader, RangePolicy};
pub use errors::{BolaoError, BolaoResult};
pub use games::{find_game, LotteryGame, LOTTERY_GAMES};
pub use lucky::{LuckyNumberGenerator, LuckyNumbers, NumberSource, TextGenerator};
pub use pools::{Bet, Participation, PaymentStatus, Pool, PoolDraft, PoolStatus, User, UserRole};
pub use services::{ServiceBuilder, ServiceContainer};
