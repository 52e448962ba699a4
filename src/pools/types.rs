//! Pool aggregate, its status set, and the users that organize pools.

use crate::errors::PoolError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pool lifecycle states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoolStatus {
    Open,
    AwaitingPayment,
    Closed,
    BetPlaced,
    AwaitingResult,
    Winning,
    Finished,
    Cancelled,
}

impl PoolStatus {
    /// Badge text shown on pool cards
    pub fn label(&self) -> String {
        match self {
            PoolStatus::Open => "ABERTO".to_string(),
            PoolStatus::Closed => "FECHADO".to_string(),
            PoolStatus::BetPlaced => "APOSTADO".to_string(),
            PoolStatus::Winning => "PREMIADO".to_string(),
            other => other.to_string(),
        }
    }

    /// No transition leaves these states except cancellation of a finished pool
    pub fn is_terminal(&self) -> bool {
        matches!(self, PoolStatus::Finished | PoolStatus::Cancelled)
    }
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolStatus::Open => "OPEN",
            PoolStatus::AwaitingPayment => "AWAITING_PAYMENT",
            PoolStatus::Closed => "CLOSED",
            PoolStatus::BetPlaced => "BET_PLACED",
            PoolStatus::AwaitingResult => "AWAITING_RESULT",
            PoolStatus::Winning => "WINNING",
            PoolStatus::Finished => "FINISHED",
            PoolStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", name)
    }
}

/// A group lottery purchase divided into quotas
///
/// Deserialisation rejects records selling more quotas than the pool has.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", try_from = "PoolRecord")]
pub struct Pool {
    pub id: String,
    pub name: String,
    pub organizer_id: String,
    /// Registry slug, e.g. "mega-sena"; not checked against the registry
    pub game_type: String,
    pub total_quotas: u32,
    pub available_quotas: u32,
    pub price_per_quota: f64,
    pub status: PoolStatus,
    pub closing_date: DateTime<Utc>,
    pub draw_date: DateTime<Utc>,
    pub description: String,
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_code: Option<String>,
}

/// Wire shape of a [`Pool`] before its quota counts are checked
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoolRecord {
    id: String,
    name: String,
    organizer_id: String,
    game_type: String,
    total_quotas: u32,
    available_quotas: u32,
    price_per_quota: f64,
    status: PoolStatus,
    closing_date: DateTime<Utc>,
    draw_date: DateTime<Utc>,
    #[serde(default)]
    description: String,
    is_public: bool,
    #[serde(default)]
    access_code: Option<String>,
}

impl TryFrom<PoolRecord> for Pool {
    type Error = PoolError;

    fn try_from(record: PoolRecord) -> Result<Self, Self::Error> {
        let pool = Pool {
            id: record.id,
            name: record.name,
            organizer_id: record.organizer_id,
            game_type: record.game_type,
            total_quotas: record.total_quotas,
            available_quotas: record.available_quotas,
            price_per_quota: record.price_per_quota,
            status: record.status,
            closing_date: record.closing_date,
            draw_date: record.draw_date,
            description: record.description,
            is_public: record.is_public,
            access_code: record.access_code,
        };
        pool.check_quotas()?;
        Ok(pool)
    }
}

impl Pool {
    /// Build a freshly opened pool from an organizer's draft
    pub fn from_draft(id: String, organizer_id: &str, draft: PoolDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            organizer_id: organizer_id.to_string(),
            game_type: draft.game_type,
            total_quotas: draft.total_quotas,
            available_quotas: draft.total_quotas,
            price_per_quota: draft.price_per_quota,
            status: PoolStatus::Open,
            closing_date: draft.closing_date.unwrap_or(now),
            draw_date: draft.draw_date.unwrap_or(now),
            description: draft.description,
            is_public: draft.is_public,
            access_code: draft.access_code,
        }
    }

    /// Available quotas never exceed the total
    pub fn check_quotas(&self) -> Result<(), PoolError> {
        if self.available_quotas > self.total_quotas {
            return Err(PoolError::InconsistentQuotas {
                total: self.total_quotas,
                available: self.available_quotas,
            });
        }
        Ok(())
    }

    pub fn sold_quotas(&self) -> u32 {
        self.total_quotas.saturating_sub(self.available_quotas)
    }

    pub fn is_sold_out(&self) -> bool {
        self.available_quotas == 0
    }

    /// Fraction of quotas sold, 0.0 for a pool without quotas
    pub fn progress(&self) -> f64 {
        if self.total_quotas == 0 {
            return 0.0;
        }
        self.sold_quotas() as f64 / self.total_quotas as f64
    }

    /// Whether the closing date has been reached
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.closing_date
    }

    /// Public pools are visible to everyone; private ones need the exact access code
    pub fn is_visible_to(&self, access_code: Option<&str>) -> bool {
        if self.is_public {
            return true;
        }
        match (self.access_code.as_deref(), access_code) {
            (Some(expected), Some(given)) => expected == given,
            _ => false,
        }
    }

    /// Amount collected if every quota sells
    pub fn target_amount(&self) -> f64 {
        self.price_per_quota * self.total_quotas as f64
    }
}

/// Organizer input for creating a pool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub game_type: String,
    pub total_quotas: u32,
    pub price_per_quota: f64,
    #[serde(default)]
    pub closing_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub draw_date: Option<DateTime<Utc>>,
    #[serde(default = "default_is_public")]
    pub is_public: bool,
    #[serde(default)]
    pub access_code: Option<String>,
}

fn default_is_public() -> bool {
    true
}

impl Default for PoolDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            game_type: "mega-sena".to_string(),
            total_quotas: 20,
            price_per_quota: 10.0,
            closing_date: None,
            draw_date: None,
            is_public: true,
            access_code: None,
        }
    }
}

impl PoolDraft {
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.name.trim().is_empty() {
            return Err(PoolError::InvalidDraft("name must not be empty".to_string()));
        }
        if !self.price_per_quota.is_finite() || self.price_per_quota < 0.0 {
            return Err(PoolError::InvalidDraft(format!(
                "price per quota must be a non-negative amount, got {}",
                self.price_per_quota
            )));
        }
        if !self.is_public && self.access_code.as_deref().map_or(true, str::is_empty) {
            return Err(PoolError::InvalidDraft(
                "private pools need an access code".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Participant,
    Organizer,
    SuperAdmin,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl User {
    /// The organizer the demo catalog is seeded for
    pub fn demo_organizer() -> Self {
        Self {
            id: "u1".to_string(),
            name: "João Silva".to_string(),
            email: "joao@email.com".to_string(),
            role: UserRole::Organizer,
            is_verified: true,
            avatar_url: None,
        }
    }

    pub fn can_organize(&self) -> bool {
        matches!(self.role, UserRole::Organizer | UserRole::SuperAdmin)
    }
}
