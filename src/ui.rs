use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right-aligned cell for a currency amount.
pub fn money_cell(value: f64) -> Cell {
    Cell::new(format!("${value:.2}")).set_alignment(CellAlignment::Right)
}

/// Right-aligned plain-text cell.
pub fn value_cell(text: &str) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Gain/loss amount with color coding: green at or above zero, red below.
pub fn gain_loss_cell(amount: f64) -> Cell {
    let color = if amount >= 0.0 { Color::Green } else { Color::Red };
    Cell::new(format!("${amount:.2}"))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Gain/loss percentage with the same color coding.
pub fn gain_loss_percent_cell(percent: f64) -> Cell {
    let color = if percent >= 0.0 { Color::Green } else { Color::Red };
    Cell::new(format!("{percent:.2}%"))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Creates a spinner shown while a fetch cycle runs.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    pb
}
