use super::{MarketSnapshot, portfolio, streaks, ui};
use crate::core::config::AppConfig;
use crate::providers::orchestrator::PriceOrchestrator;
use anyhow::Result;
use tracing::warn;

fn print_error(what: &str, err: &anyhow::Error) {
    let cause = format!("{err:#}");
    warn!(error = %cause, "{what} unavailable");
    println!(
        "{}",
        ui::style_text(&format!("{what} unavailable: {cause}"), ui::StyleType::Error)
    );
}

/// Dashboard: latest price, simulated portfolio and weekly streaks. A failing
/// section is reported in place and does not hide the others.
pub async fn run(config: &AppConfig, orchestrator: &PriceOrchestrator) -> Result<()> {
    let snapshot = MarketSnapshot::fetch(orchestrator).await;
    snapshot.print_notices();

    println!(
        "{}\n",
        ui::style_text(&format!("Round-ups into {}", config.symbol), ui::StyleType::Title)
    );

    match &snapshot.quote {
        Ok(quote) => println!(
            "Latest price: {}",
            ui::style_text(&format!("{:.2}", quote.value.close), ui::StyleType::TotalValue)
        ),
        Err(e) => println!(
            "{}",
            ui::style_text(&format!("Latest price unavailable: {e}"), ui::StyleType::Error)
        ),
    }

    ui::print_separator();
    match portfolio::simulate_portfolio(config, snapshot) {
        Ok(simulation) => println!("{}", simulation.display_totals(&config.symbol)),
        Err(e) => print_error("Portfolio", &e),
    }

    ui::print_separator();
    let today = chrono::Local::now().date_naive();
    match streaks::load_streaks(config, today) {
        Ok(summary) => {
            print!("{}", summary.display_heatmap());
            println!("\n{}", summary.display_counts());
        }
        Err(e) => print_error("Streaks", &e),
    }

    Ok(())
}
