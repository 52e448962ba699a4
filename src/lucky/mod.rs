pub mod client;
pub mod generator;

pub use client::{GeminiClient, TextGenerator, TextRequest};
pub use generator::{draw_unique, parse_numbers, LuckyNumberGenerator, LuckyNumbers, NumberSource, RULES_UNAVAILABLE};
