use super::ui;
use crate::core::config::AppConfig;
use crate::core::contribution::{ContributionRow, NormalizationReport};
use crate::store::contributions::load_contributions;
use anyhow::Result;
use comfy_table::{Cell, Color};

impl NormalizationReport {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Line"),
            ui::header_cell("Date"),
            ui::header_cell("Amount"),
            ui::header_cell("Round-up"),
            ui::header_cell("Merchant"),
            ui::header_cell("Category"),
            ui::header_cell("Status"),
        ]);

        for row in &self.rows {
            table.add_row(vec![
                Cell::new(row.line),
                Cell::new(row.date.map_or("N/A".to_string(), |d| d.to_string())),
                ui::format_optional_cell(row.amount, |a| format!("{a:.2}")),
                ui::decimal_cell(row.roundup, 2),
                Cell::new(row.merchant.as_deref().unwrap_or("")),
                Cell::new(row.category.as_deref().unwrap_or("")),
                status_cell(row),
            ]);
        }

        let mut output = table.to_string();
        output.push_str(&format!(
            "\n\n{} {}   {} {}   {} {}",
            ui::style_text("Valid:", ui::StyleType::TotalLabel),
            self.valid_count,
            ui::style_text("Invalid:", ui::StyleType::TotalLabel),
            self.invalid_count,
            ui::style_text("Total round-up:", ui::StyleType::TotalLabel),
            ui::style_text(
                &format!("{:.2}", self.total_roundup),
                ui::StyleType::TotalValue
            ),
        ));
        output
    }
}

fn status_cell(row: &ContributionRow) -> Cell {
    if row.valid {
        return Cell::new("ok").fg(Color::Green);
    }
    let issues: Vec<&str> = row.issues.iter().map(|i| i.as_str()).collect();
    Cell::new(issues.join(", ")).fg(Color::Red)
}

pub fn run(config: &AppConfig) -> Result<()> {
    let path = config.contributions_path();
    let report = load_contributions(&path)?;

    println!(
        "Contributions: {}\n",
        ui::style_text(&path.display().to_string(), ui::StyleType::Title)
    );
    if report.rows.is_empty() {
        println!("No rows found.");
        return Ok(());
    }
    println!("{}", report.display_as_table());
    Ok(())
}
