//! Buy-and-hold replay of contributions against a daily price series.
use crate::core::contribution::ContributionEvent;
use crate::core::price::PricePoint;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// One priced contribution and the running position after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationStep {
    pub date: chrono::NaiveDate,
    /// Cash put in by this contribution.
    pub amount: Decimal,
    /// Cumulative cash invested up to and including this step.
    pub invested: Decimal,
    pub price: Decimal,
    pub shares_bought: Decimal,
    pub total_shares: Decimal,
    pub value_now: Decimal,
    pub gain_loss: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortfolioSimulation {
    pub shares: Decimal,
    pub total_invested: Decimal,
    pub current_value: Decimal,
    pub history: Vec<SimulationStep>,
}

impl PortfolioSimulation {
    pub fn gain_loss(&self) -> Decimal {
        self.current_value - self.total_invested
    }
}

/// Close of the latest point dated on or before `date`. `sorted` must be ascending.
fn price_at_or_before(sorted: &[PricePoint], date: chrono::NaiveDate) -> Option<Decimal> {
    let idx = sorted.partition_point(|p| p.date <= date);
    idx.checked_sub(1).map(|i| sorted[i].close)
}

/// Replays `contributions` in the given order, buying at the last close on or
/// before each contribution date and valuing the position at `latest_price`.
///
/// Contributions dated before the first close cannot be priced and are skipped.
/// An empty series yields the zero result.
pub fn simulate(
    contributions: &[ContributionEvent],
    price_series: &[PricePoint],
    latest_price: Decimal,
) -> PortfolioSimulation {
    let mut sorted: Vec<PricePoint> = price_series
        .iter()
        .filter(|p| p.close > Decimal::ZERO)
        .copied()
        .collect();
    if sorted.is_empty() {
        debug!("No price data provided to simulate");
        return PortfolioSimulation::default();
    }
    sorted.sort_by_key(|p| p.date);

    let mut total_shares = Decimal::ZERO;
    let mut invested = Decimal::ZERO;
    let mut current_value = Decimal::ZERO;
    let mut history = Vec::with_capacity(contributions.len());

    for contribution in contributions {
        let Some(price) = price_at_or_before(&sorted, contribution.date) else {
            debug!(date = %contribution.date, "No price on or before contribution date, skipping");
            continue;
        };
        let Some(shares_bought) = contribution.amount.checked_div(price) else {
            debug!(date = %contribution.date, "Share count overflow, skipping");
            continue;
        };

        let next = total_shares.checked_add(shares_bought).and_then(|shares| {
            let invested = invested.checked_add(contribution.amount)?;
            let value_now = shares.checked_mul(latest_price)?;
            Some((shares, invested, value_now, value_now.checked_sub(invested)?))
        });
        let Some((shares, next_invested, value_now, gain_loss)) = next else {
            debug!(date = %contribution.date, "Position overflow, skipping");
            continue;
        };

        total_shares = shares;
        invested = next_invested;
        current_value = value_now;
        history.push(SimulationStep {
            date: contribution.date,
            amount: contribution.amount,
            invested,
            price,
            shares_bought,
            total_shares,
            value_now,
            gain_loss,
        });
    }

    PortfolioSimulation {
        shares: total_shares,
        total_invested: invested,
        current_value,
        history,
    }
}
