//! In-memory pool catalog.
//!
//! The catalog owns every pool together with its participations and bets.
//! It is a plain value passed by reference; there is no process-wide state.

use crate::errors::{BolaoResult, LookupError, PoolError};
use crate::games::find_game;
use crate::pools::{Bet, Participation, PaymentStatus, Pool, PoolDraft, PoolStatus, User};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct PoolCatalog {
    /// Most recent first
    pools: Vec<Pool>,
    participations: Vec<Participation>,
    bets: Vec<Bet>,
}

impl PoolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with the two demo pools
    pub fn with_demo_data() -> Self {
        let organizer = User::demo_organizer();
        let pools = vec![
            Pool {
                id: "p1".to_string(),
                name: "Mega da Virada - Bairro X".to_string(),
                organizer_id: organizer.id.clone(),
                game_type: "mega-sena".to_string(),
                total_quotas: 50,
                available_quotas: 12,
                price_per_quota: 25.0,
                status: PoolStatus::Open,
                closing_date: utc(2024, 12, 30, 18),
                draw_date: utc(2024, 12, 31, 20),
                description: "Bolão anual do bairro. Muita sorte para todos!".to_string(),
                is_public: true,
                access_code: None,
            },
            Pool {
                id: "p2".to_string(),
                name: "Lotofácil Turbo".to_string(),
                organizer_id: "u2".to_string(),
                game_type: "lotofacil".to_string(),
                total_quotas: 20,
                available_quotas: 0,
                price_per_quota: 15.0,
                status: PoolStatus::Closed,
                closing_date: utc(2024, 10, 20, 18),
                draw_date: utc(2024, 10, 20, 20),
                description: "Estratégia de 17 números.".to_string(),
                is_public: true,
                access_code: None,
            },
        ];

        Self {
            pools,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Open a new pool for `organizer_id`; it is listed first
    pub fn create(&mut self, draft: PoolDraft, organizer_id: &str) -> BolaoResult<&Pool> {
        self.create_at(draft, organizer_id, Utc::now())
    }

    pub fn create_at(
        &mut self,
        draft: PoolDraft,
        organizer_id: &str,
        now: DateTime<Utc>,
    ) -> BolaoResult<&Pool> {
        draft.validate()?;

        let id = format!("p-{}", Uuid::new_v4());
        let pool = Pool::from_draft(id, organizer_id, draft, now);
        info!(
            pool_id = %pool.id,
            organizer_id,
            game_type = %pool.game_type,
            total_quotas = pool.total_quotas,
            "Pool created"
        );

        self.pools.insert(0, pool);
        Ok(&self.pools[0])
    }

    /// Public pools in catalog order
    pub fn list_public(&self) -> Vec<&Pool> {
        self.pools.iter().filter(|pool| pool.is_public).collect()
    }

    pub fn list_by_organizer(&self, user_id: &str) -> Vec<&Pool> {
        self.pools
            .iter()
            .filter(|pool| pool.organizer_id == user_id)
            .collect()
    }

    /// Public pools plus private pools unlocked by `access_code`
    pub fn list_visible(&self, access_code: Option<&str>) -> Vec<&Pool> {
        self.pools
            .iter()
            .filter(|pool| pool.is_visible_to(access_code))
            .collect()
    }

    /// Case-insensitive match on name or description among public pools
    pub fn search(&self, query: &str) -> Vec<&Pool> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.list_public();
        }
        self.pools
            .iter()
            .filter(|pool| pool.is_public)
            .filter(|pool| {
                pool.name.to_lowercase().contains(&needle)
                    || pool.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn find_by_id(&self, pool_id: &str) -> Result<&Pool, LookupError> {
        self.pools
            .iter()
            .find(|pool| pool.id == pool_id)
            .ok_or_else(|| LookupError::PoolNotFound(pool_id.to_string()))
    }

    fn pool_mut(&mut self, pool_id: &str) -> Result<&mut Pool, LookupError> {
        self.pools
            .iter_mut()
            .find(|pool| pool.id == pool_id)
            .ok_or_else(|| LookupError::PoolNotFound(pool_id.to_string()))
    }

    /// Buy quotas for `user_id`, recording a pending participation
    pub fn purchase_quotas(
        &mut self,
        pool_id: &str,
        user_id: &str,
        quantity: u32,
    ) -> BolaoResult<Participation> {
        let pool = self.pool_mut(pool_id)?;
        pool.purchase_quotas(quantity)?;
        info!(pool_id, user_id, quantity, available = pool.available_quotas, "Quotas purchased");

        let participation =
            Participation::pending(format!("pt-{}", Uuid::new_v4()), user_id, pool_id, quantity);
        self.participations.push(participation.clone());
        Ok(participation)
    }

    /// Mark a pending participation as paid
    pub fn confirm_payment(&mut self, participation_id: &str) -> BolaoResult<Participation> {
        let participation = self
            .participations
            .iter_mut()
            .find(|p| p.id == participation_id)
            .ok_or_else(|| LookupError::ParticipationNotFound(participation_id.to_string()))?;

        participation.mark_paid(Utc::now())?;
        info!(participation_id, pool_id = %participation.pool_id, "Payment confirmed");
        Ok(participation.clone())
    }

    pub fn participations_for(&self, pool_id: &str) -> Vec<&Participation> {
        self.participations
            .iter()
            .filter(|p| p.pool_id == pool_id)
            .collect()
    }

    pub fn begin_payment(&mut self, pool_id: &str) -> BolaoResult<&Pool> {
        let pool = self.pool_mut(pool_id)?;
        pool.begin_payment()?;
        Ok(&*pool)
    }

    pub fn close_pool(&mut self, pool_id: &str, now: DateTime<Utc>) -> BolaoResult<&Pool> {
        let pool = self.pool_mut(pool_id)?;
        pool.close(now)?;
        Ok(&*pool)
    }

    /// Close every open or paying pool that is sold out or past its closing date
    pub fn close_due(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let mut closed = Vec::new();
        for pool in self.pools.iter_mut().filter(|pool| {
            matches!(pool.status, PoolStatus::Open | PoolStatus::AwaitingPayment)
                && (pool.is_sold_out() || pool.is_due(now))
        }) {
            if pool.close(now).is_ok() {
                closed.push(pool.id.clone());
            }
        }
        closed
    }

    /// Record the numbers played for a closed pool
    pub fn place_bet(
        &mut self,
        pool_id: &str,
        numbers: Vec<u32>,
        contest_number: u32,
        proof_url: Option<String>,
    ) -> BolaoResult<Bet> {
        if numbers.is_empty() {
            return Err(PoolError::InvalidBet("no numbers were played".to_string()).into());
        }

        let pool = self.pool_mut(pool_id)?;
        check_bet_numbers(&pool.game_type, &numbers)?;
        pool.place_bet()?;

        let bet = Bet {
            id: format!("b-{}", Uuid::new_v4()),
            pool_id: pool_id.to_string(),
            numbers,
            contest_number,
            proof_url,
            timestamp: Utc::now(),
        };
        self.bets.push(bet.clone());
        Ok(bet)
    }

    pub fn bets_for(&self, pool_id: &str) -> Vec<&Bet> {
        self.bets.iter().filter(|bet| bet.pool_id == pool_id).collect()
    }

    pub fn await_result(&mut self, pool_id: &str) -> BolaoResult<&Pool> {
        let pool = self.pool_mut(pool_id)?;
        pool.await_result()?;
        Ok(&*pool)
    }

    pub fn resolve(&mut self, pool_id: &str, won: bool) -> BolaoResult<&Pool> {
        let pool = self.pool_mut(pool_id)?;
        pool.resolve(won)?;
        Ok(&*pool)
    }

    pub fn finish(&mut self, pool_id: &str) -> BolaoResult<&Pool> {
        let pool = self.pool_mut(pool_id)?;
        pool.finish()?;
        Ok(&*pool)
    }

    /// Cancel a pool and refund its participations
    pub fn cancel_pool(&mut self, pool_id: &str) -> BolaoResult<&Pool> {
        self.pool_mut(pool_id)?.cancel()?;

        let mut refunded = 0;
        for participation in self
            .participations
            .iter_mut()
            .filter(|p| p.pool_id == pool_id && p.payment_status != PaymentStatus::Refunded)
        {
            participation.mark_refunded();
            refunded += 1;
        }
        info!(pool_id, refunded, "Pool cancelled");

        Ok(self.find_by_id(pool_id)?)
    }
}

/// Played numbers must be distinct and, for registered games, within the game's range
fn check_bet_numbers(game_type: &str, numbers: &[u32]) -> Result<(), PoolError> {
    let mut seen = HashSet::with_capacity(numbers.len());
    if let Some(duplicate) = numbers.iter().find(|n| !seen.insert(**n)) {
        return Err(PoolError::InvalidBet(format!("number {} played twice", duplicate)));
    }

    if let Ok(game) = find_game(game_type) {
        if let Some(out_of_range) = numbers.iter().find(|n| !(1..=game.max_numbers).contains(*n)) {
            return Err(PoolError::InvalidBet(format!(
                "number {} is outside 1..={} for {}",
                out_of_range, game.max_numbers, game.name
            )));
        }
    }
    Ok(())
}

fn utc(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .unwrap_or_default()
}
