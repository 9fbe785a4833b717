use super::ui;
use crate::core::config::AppConfig;
use crate::core::streak::{self, StreakSummary};
use crate::store::contributions::load_contributions;
use anyhow::Result;
use chrono::NaiveDate;

/// Heatmap rows; the 52 weeks are laid out oldest first, left to right.
const HEATMAP_ROWS: usize = 2;

impl StreakSummary {
    pub fn display_heatmap(&self) -> String {
        let per_row = self.weekly_totals.len().div_ceil(HEATMAP_ROWS).max(1);
        let mut output = String::new();
        for chunk in self.weekly_totals.chunks(per_row) {
            if let Some(first) = chunk.first() {
                output.push_str(&ui::style_text(
                    &format!("{} ", first.week_start.format("%Y-%m-%d")),
                    ui::StyleType::Subtle,
                ));
            }
            let squares: Vec<String> = chunk.iter().map(|b| ui::heat_square(b.heat())).collect();
            output.push_str(&squares.join(" "));
            output.push('\n');
        }
        output
    }

    pub fn display_counts(&self) -> String {
        format!(
            "Current streak: {} weeks\nLongest streak: {} weeks",
            ui::style_text(&self.current_streak.to_string(), ui::StyleType::TotalValue),
            ui::style_text(&self.longest_streak.to_string(), ui::StyleType::TotalLabel),
        )
    }
}

/// Streaks for the configured contributions as of `today`.
pub fn load_streaks(config: &AppConfig, today: NaiveDate) -> Result<StreakSummary> {
    let report = load_contributions(&config.contributions_path())?;
    Ok(streak::calculate_streaks(&report.events(), today))
}

pub fn run(config: &AppConfig) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let summary = load_streaks(config, today)?;

    println!(
        "{}\n",
        ui::style_text("Weekly contributions", ui::StyleType::Title)
    );
    print!("{}", summary.display_heatmap());
    println!("\n{}", summary.display_counts());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contribution::ContributionEvent;
    use rust_decimal_macros::dec;

    #[test]
    fn test_heatmap_has_two_rows_of_26() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 18).unwrap();
        let events = vec![ContributionEvent {
            date: today,
            amount: dec!(3),
            roundup: dec!(0),
            merchant: None,
            category: None,
        }];
        let summary = streak::calculate_streaks(&events, today);

        let heatmap = console::strip_ansi_codes(&summary.display_heatmap()).to_string();
        let lines: Vec<&str> = heatmap.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert_eq!(line.matches('■').count(), 26);
        }
        assert!(lines[0].starts_with("2024-06-24"));

        let counts = console::strip_ansi_codes(&summary.display_counts()).to_string();
        assert!(counts.contains("Current streak: 1 weeks"));
        assert!(counts.contains("Longest streak: 1 weeks"));
    }
}
