//! Participations and bets recorded against a pool.

use crate::errors::PoolError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "PENDING"),
            PaymentStatus::Paid => write!(f, "PAID"),
            PaymentStatus::Refunded => write!(f, "REFUNDED"),
        }
    }
}

/// A user's share of a pool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    pub id: String,
    pub user_id: String,
    pub pool_id: String,
    pub quotas: u32,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Participation {
    pub fn pending(id: String, user_id: &str, pool_id: &str, quotas: u32) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            pool_id: pool_id.to_string(),
            quotas,
            payment_status: PaymentStatus::Pending,
            paid_at: None,
        }
    }

    /// PENDING -> PAID
    pub fn mark_paid(&mut self, now: DateTime<Utc>) -> Result<(), PoolError> {
        if self.payment_status != PaymentStatus::Pending {
            return Err(PoolError::PaymentNotPending {
                status: self.payment_status,
            });
        }
        self.payment_status = PaymentStatus::Paid;
        self.paid_at = Some(now);
        Ok(())
    }

    /// Refunds are idempotent; a pending payment is simply voided.
    pub fn mark_refunded(&mut self) {
        self.payment_status = PaymentStatus::Refunded;
    }
}

/// Numbers actually played for a pool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    pub id: String,
    pub pool_id: String,
    pub numbers: Vec<u32>,
    pub contest_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_confirmation() {
        let mut participation = Participation::pending("pt1".to_string(), "u1", "p1", 2);
        let now = Utc::now();

        participation.mark_paid(now).unwrap();
        assert_eq!(participation.payment_status, PaymentStatus::Paid);
        assert_eq!(participation.paid_at, Some(now));

        assert_eq!(
            participation.mark_paid(now),
            Err(PoolError::PaymentNotPending {
                status: PaymentStatus::Paid
            })
        );
    }

    #[test]
    fn test_refunded_participation_cannot_be_paid() {
        let mut participation = Participation::pending("pt1".to_string(), "u1", "p1", 1);
        participation.mark_refunded();
        assert!(participation.mark_paid(Utc::now()).is_err());
    }
}
