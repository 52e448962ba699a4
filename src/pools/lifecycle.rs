//! Quota accounting and status transitions for a single pool.
//!
//! Every operation checks its preconditions before touching the pool, so a
//! rejected call leaves quotas and status exactly as they were.

use super::types::{Pool, PoolStatus};
use crate::errors::PoolError;
use chrono::{DateTime, Utc};
use tracing::info;

impl Pool {
    /// Sell `quantity` quotas of an open pool
    pub fn purchase_quotas(&mut self, quantity: u32) -> Result<(), PoolError> {
        if self.status != PoolStatus::Open {
            return Err(PoolError::PoolNotOpen { status: self.status });
        }
        if quantity == 0 {
            return Err(PoolError::InvalidQuantity);
        }
        if quantity > self.available_quotas {
            return Err(PoolError::InsufficientQuotas {
                requested: quantity,
                available: self.available_quotas,
            });
        }

        self.available_quotas -= quantity;
        Ok(())
    }

    /// OPEN -> AWAITING_PAYMENT: stop sales while purchases are being paid
    pub fn begin_payment(&mut self) -> Result<(), PoolError> {
        self.transition(&[PoolStatus::Open], PoolStatus::AwaitingPayment)
    }

    /// OPEN | AWAITING_PAYMENT -> CLOSED, once sold out or past the closing date
    pub fn close(&mut self, now: DateTime<Utc>) -> Result<(), PoolError> {
        self.check_source(&[PoolStatus::Open, PoolStatus::AwaitingPayment], PoolStatus::Closed)?;
        if !self.is_sold_out() && !self.is_due(now) {
            return Err(PoolError::CloseConditionUnmet {
                closing_date: self.closing_date,
                available: self.available_quotas,
            });
        }
        self.apply(PoolStatus::Closed);
        Ok(())
    }

    /// CLOSED -> BET_PLACED: the organizer registered the played numbers
    pub fn place_bet(&mut self) -> Result<(), PoolError> {
        self.transition(&[PoolStatus::Closed], PoolStatus::BetPlaced)
    }

    /// BET_PLACED -> AWAITING_RESULT
    pub fn await_result(&mut self) -> Result<(), PoolError> {
        self.transition(&[PoolStatus::BetPlaced], PoolStatus::AwaitingResult)
    }

    /// AWAITING_RESULT -> WINNING | FINISHED
    pub fn resolve(&mut self, won: bool) -> Result<(), PoolError> {
        let target = if won {
            PoolStatus::Winning
        } else {
            PoolStatus::Finished
        };
        self.transition(&[PoolStatus::AwaitingResult], target)
    }

    /// WINNING -> FINISHED once the prize has been shared out
    pub fn finish(&mut self) -> Result<(), PoolError> {
        self.transition(&[PoolStatus::Winning], PoolStatus::Finished)
    }

    /// Any state except CANCELLED -> CANCELLED
    pub fn cancel(&mut self) -> Result<(), PoolError> {
        if self.status == PoolStatus::Cancelled {
            return Err(PoolError::InvalidTransition {
                from: self.status,
                to: PoolStatus::Cancelled,
            });
        }
        self.apply(PoolStatus::Cancelled);
        Ok(())
    }

    fn transition(&mut self, allowed: &[PoolStatus], to: PoolStatus) -> Result<(), PoolError> {
        self.check_source(allowed, to)?;
        self.apply(to);
        Ok(())
    }

    fn check_source(&self, allowed: &[PoolStatus], to: PoolStatus) -> Result<(), PoolError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(PoolError::InvalidTransition {
                from: self.status,
                to,
            })
        }
    }

    fn apply(&mut self, to: PoolStatus) {
        info!(pool_id = %self.id, from = %self.status, to = %to, "Pool status changed");
        self.status = to;
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::PoolError;
    use crate::pools::{Pool, PoolDraft, PoolStatus};
    use chrono::{Duration, TimeZone, Utc};

    fn open_pool(total_quotas: u32) -> Pool {
        let now = Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap();
        let draft = PoolDraft {
            name: "Lotofácil Turbo".to_string(),
            game_type: "lotofacil".to_string(),
            total_quotas,
            price_per_quota: 15.0,
            closing_date: Some(now + Duration::days(19)),
            ..Default::default()
        };
        Pool::from_draft("p2".to_string(), "u2", draft, now)
    }

    fn pool_in(status: PoolStatus) -> Pool {
        let mut pool = open_pool(20);
        pool.status = status;
        pool
    }

    #[test]
    fn test_purchase_decrements_available() {
        let mut pool = open_pool(20);
        pool.purchase_quotas(5).unwrap();
        pool.purchase_quotas(15).unwrap();
        assert_eq!(pool.available_quotas, 0);
        assert!(pool.is_sold_out());
    }

    #[test]
    fn test_purchase_more_than_available_fails() {
        let mut pool = open_pool(20);
        pool.available_quotas = 5;

        assert_eq!(
            pool.purchase_quotas(6),
            Err(PoolError::InsufficientQuotas {
                requested: 6,
                available: 5
            })
        );
        assert_eq!(pool.available_quotas, 5);
    }

    #[test]
    fn test_purchase_on_closed_pool_fails() {
        let mut pool = pool_in(PoolStatus::Closed);
        assert_eq!(
            pool.purchase_quotas(1),
            Err(PoolError::PoolNotOpen {
                status: PoolStatus::Closed
            })
        );
        assert_eq!(pool.available_quotas, 20);
    }

    #[test]
    fn test_purchase_zero_is_rejected() {
        let mut pool = open_pool(20);
        assert_eq!(pool.purchase_quotas(0), Err(PoolError::InvalidQuantity));
    }

    #[test]
    fn test_quotas_stay_in_bounds_under_any_sequence() {
        let mut pool = open_pool(7);
        for quantity in [3, 0, 9, 2, 4, 1, 1, 5] {
            let _ = pool.purchase_quotas(quantity);
            assert!(pool.available_quotas <= pool.total_quotas);
        }
        assert_eq!(pool.available_quotas, 0);
    }

    #[test]
    fn test_close_requires_sold_out_or_due() {
        let mut pool = open_pool(20);
        let before_closing = pool.closing_date - Duration::hours(1);

        assert!(matches!(
            pool.close(before_closing),
            Err(PoolError::CloseConditionUnmet { available: 20, .. })
        ));
        assert_eq!(pool.status, PoolStatus::Open);

        pool.close(pool.closing_date).unwrap();
        assert_eq!(pool.status, PoolStatus::Closed);
    }

    #[test]
    fn test_sold_out_pool_closes_early() {
        let mut pool = open_pool(4);
        pool.purchase_quotas(4).unwrap();
        pool.begin_payment().unwrap();
        pool.close(pool.closing_date - Duration::days(3)).unwrap();
        assert_eq!(pool.status, PoolStatus::Closed);
    }

    #[test]
    fn test_full_winning_lifecycle() {
        let mut pool = pool_in(PoolStatus::Closed);
        pool.place_bet().unwrap();
        pool.await_result().unwrap();
        pool.resolve(true).unwrap();
        assert_eq!(pool.status, PoolStatus::Winning);
        pool.finish().unwrap();
        assert_eq!(pool.status, PoolStatus::Finished);
    }

    #[test]
    fn test_losing_result_finishes() {
        let mut pool = pool_in(PoolStatus::AwaitingResult);
        pool.resolve(false).unwrap();
        assert_eq!(pool.status, PoolStatus::Finished);
    }

    #[test]
    fn test_transitions_validate_source_state() {
        let mut pool = open_pool(20);
        assert_eq!(
            pool.place_bet(),
            Err(PoolError::InvalidTransition {
                from: PoolStatus::Open,
                to: PoolStatus::BetPlaced
            })
        );
        assert!(pool.await_result().is_err());
        assert!(pool.resolve(true).is_err());
        assert!(pool.finish().is_err());
        assert_eq!(pool.status, PoolStatus::Open);

        let mut closed = pool_in(PoolStatus::Closed);
        assert!(closed.begin_payment().is_err());
        assert!(closed.close(closed.closing_date).is_err());
    }

    #[test]
    fn test_cancel_from_any_state_but_cancelled() {
        for status in [
            PoolStatus::Open,
            PoolStatus::AwaitingPayment,
            PoolStatus::Closed,
            PoolStatus::BetPlaced,
            PoolStatus::AwaitingResult,
            PoolStatus::Winning,
            PoolStatus::Finished,
        ] {
            let mut pool = pool_in(status);
            pool.cancel().unwrap();
            assert_eq!(pool.status, PoolStatus::Cancelled);
        }

        let mut cancelled = pool_in(PoolStatus::Cancelled);
        assert!(cancelled.cancel().is_err());
    }
}
