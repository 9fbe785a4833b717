use super::{MarketSnapshot, ui};
use crate::core::price::PriceSeries;
use crate::providers::orchestrator::PriceOrchestrator;
use anyhow::Result;
use comfy_table::Cell;

/// Number of most recent closes shown.
const RECENT_CLOSES: usize = 10;

impl PriceSeries {
    pub fn display_recent(&self, count: usize) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("Close"),
            ui::header_cell("Change"),
        ]);

        let points = self.points();
        let start = points.len().saturating_sub(count);
        for (i, point) in points.iter().enumerate().skip(start) {
            let change = i
                .checked_sub(1)
                .map(|prev| point.close - points[prev].close);
            let change_cell = match change {
                Some(c) => ui::gain_cell(c),
                None => Cell::new(""),
            };
            table.add_row(vec![
                Cell::new(point.date),
                ui::decimal_cell(point.close, 2),
                change_cell,
            ]);
        }
        table.to_string()
    }
}

pub async fn run(symbol: &str, orchestrator: &PriceOrchestrator) -> Result<()> {
    let snapshot = MarketSnapshot::fetch(orchestrator).await;
    snapshot.print_notices();
    let (quote, series) = snapshot.require()?;

    println!(
        "{}: {}",
        ui::style_text(symbol, ui::StyleType::Title),
        ui::style_text(&format!("{:.2}", quote.value.close), ui::StyleType::TotalValue)
    );

    if series.value.is_empty() {
        println!("No daily closes available.");
        return Ok(());
    }
    println!("\n{}", series.value.display_recent(RECENT_CLOSES));
    if let (Some(first), Some(last)) = (series.value.first(), series.value.last()) {
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "{} closes from {} to {}",
                    series.value.len(),
                    first.date,
                    last.date
                ),
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}
