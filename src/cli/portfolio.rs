use super::{MarketSnapshot, ui};
use crate::core::config::AppConfig;
use crate::core::simulation::{self, PortfolioSimulation};
use crate::providers::orchestrator::PriceOrchestrator;
use crate::store::contributions::load_contributions;
use anyhow::Result;
use comfy_table::Cell;
use tracing::debug;

impl PortfolioSimulation {
    /// Totals block shared by the `portfolio` and `summary` views.
    pub fn display_totals(&self, symbol: &str) -> String {
        let gain = self.gain_loss();
        let gain_style = if gain >= rust_decimal::Decimal::ZERO {
            ui::StyleType::TotalValue
        } else {
            ui::StyleType::Error
        };
        format!(
            "Shares of {}: {:.4}\nInvested: {:.2}\nCurrent value: {}\nGain/loss: {}",
            ui::style_text(symbol, ui::StyleType::TotalLabel),
            self.shares,
            self.total_invested,
            ui::style_text(&format!("{:.2}", self.current_value), ui::StyleType::TotalValue),
            ui::style_text(&format!("{gain:.2}"), gain_style),
        )
    }

    pub fn display_history(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("Amount"),
            ui::header_cell("Price"),
            ui::header_cell("Shares"),
            ui::header_cell("Total Shares"),
            ui::header_cell("Invested"),
            ui::header_cell("Value Now"),
            ui::header_cell("Gain/Loss"),
        ]);

        for step in &self.history {
            table.add_row(vec![
                Cell::new(step.date),
                ui::decimal_cell(step.amount, 2),
                ui::decimal_cell(step.price, 2),
                ui::decimal_cell(step.shares_bought, 4),
                ui::decimal_cell(step.total_shares, 4),
                ui::decimal_cell(step.invested, 2),
                ui::decimal_cell(step.value_now, 2),
                ui::gain_cell(step.gain_loss),
            ]);
        }
        table.to_string()
    }
}

/// Replays the configured contributions against the fetched market data.
pub fn simulate_portfolio(
    config: &AppConfig,
    snapshot: MarketSnapshot,
) -> Result<PortfolioSimulation> {
    let report = load_contributions(&config.contributions_path())?;
    let events = report.events();
    let (quote, series) = snapshot.require()?;
    debug!(
        contributions = events.len(),
        closes = series.value.len(),
        "Simulating portfolio"
    );
    Ok(simulation::simulate(
        &events,
        series.value.points(),
        quote.value.close,
    ))
}

pub async fn run(config: &AppConfig, orchestrator: &PriceOrchestrator) -> Result<()> {
    let snapshot = MarketSnapshot::fetch(orchestrator).await;
    snapshot.print_notices();
    let simulation = simulate_portfolio(config, snapshot)?;

    println!(
        "Portfolio: {}\n",
        ui::style_text(&config.symbol, ui::StyleType::Title)
    );
    if simulation.history.is_empty() {
        println!("No contributions could be priced.");
        return Ok(());
    }
    println!("{}\n", simulation.display_history());
    println!("{}", simulation.display_totals(&config.symbol));
    Ok(())
}
