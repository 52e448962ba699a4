pub mod types;
pub mod lifecycle;
pub mod records;

pub use types::{Pool, PoolDraft, PoolStatus, User, UserRole};
pub use records::{Bet, Participation, PaymentStatus};
