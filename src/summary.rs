//! Aggregation and table rendering for the stack
//!
//! Pure functions over holdings plus a price snapshot. Nothing here fetches:
//! consumers read whatever the cache currently holds. Only Goldback rows are
//! valued live; bulk metal and coin rows use their stored values.

use comfy_table::Cell;

use crate::holdings::{BulkMetal, Coin, GoldbackNote, Holdings};
use crate::spot::{GOLD, PriceSnapshot};
use crate::ui;
use crate::valuation;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryTotals {
    pub current_value: f64,
    pub cost_basis: f64,
}

impl CategoryTotals {
    fn add(&mut self, current_value: f64, cost_basis: f64) {
        self.current_value += current_value;
        self.cost_basis += cost_basis;
    }

    pub fn gain_loss(&self) -> f64 {
        valuation::gain_loss(self.current_value, self.cost_basis)
    }

    pub fn gain_loss_percent(&self) -> f64 {
        valuation::gain_loss_percent(self.current_value, self.cost_basis)
    }
}

#[derive(Debug)]
pub struct StackSummary {
    pub metals: CategoryTotals,
    pub coins: CategoryTotals,
    pub goldbacks: CategoryTotals,
}

impl StackSummary {
    pub fn combined(&self) -> CategoryTotals {
        let mut totals = CategoryTotals::default();
        totals.add(self.metals.current_value, self.metals.cost_basis);
        totals.add(self.coins.current_value, self.coins.cost_basis);
        totals.add(self.goldbacks.current_value, self.goldbacks.cost_basis);
        totals
    }
}

pub fn summarize(holdings: &Holdings, snapshot: &PriceSnapshot) -> StackSummary {
    let mut metals = CategoryTotals::default();
    for metal in &holdings.metals {
        metals.add(metal.current_value, metal.cost_basis);
    }

    let mut coins = CategoryTotals::default();
    for coin in &holdings.coins {
        coins.add(coin.worth, coin.cost_basis);
    }

    let gold_price = snapshot.price(GOLD);
    let mut goldbacks = CategoryTotals::default();
    for note in &holdings.goldbacks {
        let worth = valuation::goldback_worth(note.denomination, note.count, gold_price);
        goldbacks.add(worth, note.cost_basis);
    }

    StackSummary {
        metals,
        coins,
        goldbacks,
    }
}

/// One-line spot price banner: every cached price plus the last fetch time.
pub fn spot_banner(snapshot: &PriceSnapshot) -> String {
    let prices = snapshot
        .prices
        .iter()
        .map(|(metal, price)| format!("{metal} ${price:.2}"))
        .collect::<Vec<_>>()
        .join("  ");
    let updated = match snapshot.last_updated {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "never".to_string(),
    };
    format!(
        "Spot: {}  {}",
        prices,
        ui::style_text(&format!("(updated {updated})"), ui::StyleType::Subtle)
    )
}

pub fn render_dashboard(summary: &StackSummary, snapshot: &PriceSnapshot) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Cost Basis"),
        ui::header_cell("Value"),
        ui::header_cell("Gain/Loss"),
        ui::header_cell("Gain/Loss (%)"),
    ]);

    for (label, totals) in [
        ("Metals", &summary.metals),
        ("Coins", &summary.coins),
        ("Goldbacks", &summary.goldbacks),
    ] {
        table.add_row(vec![
            Cell::new(label),
            ui::money_cell(totals.cost_basis),
            ui::money_cell(totals.current_value),
            ui::gain_loss_cell(totals.gain_loss()),
            ui::gain_loss_percent_cell(totals.gain_loss_percent()),
        ]);
    }

    let combined = summary.combined();
    let mut output = format!(
        "{}\n\n{}\n",
        ui::style_text("Stack Summary", ui::StyleType::Title),
        spot_banner(snapshot)
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\nTotal Value: {}  Gain/Loss: {}",
        ui::style_text(
            &format!("${:.2}", combined.current_value),
            ui::StyleType::TotalValue
        ),
        ui::style_text(
            &format!(
                "${:.2} ({:.2}%)",
                combined.gain_loss(),
                combined.gain_loss_percent()
            ),
            ui::StyleType::TotalLabel
        )
    ));
    output
}

pub fn metals_table(metals: &[BulkMetal]) -> String {
    if metals.is_empty() {
        return "No bulk metal holdings configured.".to_string();
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Name"),
        ui::header_cell("Metal"),
        ui::header_cell("Weight (oz)"),
        ui::header_cell("Purity"),
        ui::header_cell("Cost Basis"),
        ui::header_cell("Value"),
        ui::header_cell("Gain/Loss"),
        ui::header_cell("Gain/Loss (%)"),
    ]);

    let mut totals = CategoryTotals::default();
    for metal in metals {
        totals.add(metal.current_value, metal.cost_basis);
        table.add_row(vec![
            Cell::new(&metal.name),
            Cell::new(&metal.metal),
            ui::value_cell(&valuation::format_weight(metal.weight_oz)),
            ui::value_cell(&format!("{}", metal.purity)),
            ui::money_cell(metal.cost_basis),
            ui::money_cell(metal.current_value),
            ui::gain_loss_cell(valuation::gain_loss(metal.current_value, metal.cost_basis)),
            ui::gain_loss_percent_cell(valuation::gain_loss_percent(
                metal.current_value,
                metal.cost_basis,
            )),
        ]);
    }

    with_total_footer("Bulk Metals", table, &totals)
}

pub fn coins_table(coins: &[Coin]) -> String {
    if coins.is_empty() {
        return "No coin holdings configured.".to_string();
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Name"),
        ui::header_cell("Material"),
        ui::header_cell("Cost Basis"),
        ui::header_cell("Worth"),
        ui::header_cell("Gain/Loss"),
        ui::header_cell("Gain/Loss (%)"),
    ]);

    let mut totals = CategoryTotals::default();
    for coin in coins {
        totals.add(coin.worth, coin.cost_basis);
        table.add_row(vec![
            Cell::new(&coin.name),
            Cell::new(&coin.material),
            ui::money_cell(coin.cost_basis),
            ui::money_cell(coin.worth),
            ui::gain_loss_cell(valuation::gain_loss(coin.worth, coin.cost_basis)),
            ui::gain_loss_percent_cell(valuation::gain_loss_percent(coin.worth, coin.cost_basis)),
        ]);
    }

    with_total_footer("Coins", table, &totals)
}

pub fn goldbacks_table(notes: &[GoldbackNote], snapshot: &PriceSnapshot) -> String {
    if notes.is_empty() {
        return "No Goldback holdings configured.".to_string();
    }

    let gold_price = snapshot.price(GOLD);

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Denomination"),
        ui::header_cell("Count"),
        ui::header_cell("Units"),
        ui::header_cell("Cost Basis"),
        ui::header_cell("Worth"),
        ui::header_cell("Gain/Loss"),
        ui::header_cell("Gain/Loss (%)"),
    ]);

    let mut totals = CategoryTotals::default();
    for note in notes {
        let worth = valuation::goldback_worth(note.denomination, note.count, gold_price);
        totals.add(worth, note.cost_basis);
        table.add_row(vec![
            ui::value_cell(&valuation::format_denomination(note.denomination)),
            ui::value_cell(&note.count.to_string()),
            ui::value_cell(&valuation::format_denomination(valuation::goldback_units(
                note.denomination,
                note.count,
            ))),
            ui::money_cell(note.cost_basis),
            ui::money_cell(worth),
            ui::gain_loss_cell(valuation::gain_loss(worth, note.cost_basis)),
            ui::gain_loss_percent_cell(valuation::gain_loss_percent(worth, note.cost_basis)),
        ]);
    }

    with_total_footer("Goldbacks", table, &totals)
}

fn with_total_footer(title: &str, table: comfy_table::Table, totals: &CategoryTotals) -> String {
    format!(
        "{}\n\n{}\n\nTotal Value: {}  Gain/Loss: {}",
        ui::style_text(title, ui::StyleType::Title),
        table,
        ui::style_text(
            &format!("${:.2}", totals.current_value),
            ui::StyleType::TotalValue
        ),
        ui::style_text(
            &format!("${:.2} ({:.2}%)", totals.gain_loss(), totals.gain_loss_percent()),
            ui::StyleType::TotalLabel
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot_with_gold(price: f64) -> PriceSnapshot {
        PriceSnapshot {
            prices: BTreeMap::from([("gold".to_string(), price), ("silver".to_string(), 30.0)]),
            last_updated: None,
        }
    }

    fn sample_holdings() -> Holdings {
        Holdings {
            metals: vec![BulkMetal {
                name: "10 oz silver bar".to_string(),
                metal: "silver".to_string(),
                weight_oz: 10.0,
                purity: 0.999,
                cost_basis: 250.0,
                current_value: 310.0,
            }],
            coins: vec![Coin {
                name: "Morgan Dollar 1921".to_string(),
                material: "silver".to_string(),
                cost_basis: 35.0,
                worth: 42.0,
            }],
            goldbacks: vec![
                GoldbackNote {
                    denomination: 25.0,
                    count: 4,
                    cost_basis: 380.0,
                },
                GoldbackNote {
                    denomination: 0.5,
                    count: 10,
                    cost_basis: 30.0,
                },
            ],
        }
    }

    #[test]
    fn test_summarize_values_goldbacks_live() {
        let summary = summarize(&sample_holdings(), &snapshot_with_gold(2000.0));

        assert_eq!(summary.metals.current_value, 310.0);
        assert_eq!(summary.metals.cost_basis, 250.0);
        assert_eq!(summary.coins.current_value, 42.0);

        // (25/1000)*2000*2*4 + (0.5/1000)*2000*2*10
        assert_eq!(summary.goldbacks.current_value, 420.0);
        assert_eq!(summary.goldbacks.cost_basis, 410.0);
        assert_eq!(summary.goldbacks.gain_loss(), 10.0);
    }

    #[test]
    fn test_goldback_worth_tracks_snapshot() {
        let holdings = sample_holdings();

        let low = summarize(&holdings, &snapshot_with_gold(2000.0));
        let high = summarize(&holdings, &snapshot_with_gold(3000.0));

        // Stored values stay put, derived ones move with the price
        assert_eq!(low.metals.current_value, high.metals.current_value);
        assert_eq!(low.coins.current_value, high.coins.current_value);
        assert_eq!(high.goldbacks.current_value, 630.0);
    }

    #[test]
    fn test_missing_gold_price_values_goldbacks_at_zero() {
        let snapshot = PriceSnapshot {
            prices: BTreeMap::new(),
            last_updated: None,
        };
        let summary = summarize(&sample_holdings(), &snapshot);
        assert_eq!(summary.goldbacks.current_value, 0.0);
    }

    #[test]
    fn test_combined_totals() {
        let summary = summarize(&sample_holdings(), &snapshot_with_gold(2000.0));
        let combined = summary.combined();
        assert_eq!(combined.current_value, 310.0 + 42.0 + 420.0);
        assert_eq!(combined.cost_basis, 250.0 + 35.0 + 410.0);
    }

    #[test]
    fn test_empty_holdings_have_zero_percent() {
        let summary = summarize(&Holdings::default(), &snapshot_with_gold(2000.0));
        let combined = summary.combined();
        assert_eq!(combined.current_value, 0.0);
        // Guarded division: no cost basis means 0%, not NaN
        assert_eq!(combined.gain_loss_percent(), 0.0);
    }

    #[test]
    fn test_tables_render_holdings() {
        let holdings = sample_holdings();
        let snapshot = snapshot_with_gold(2000.0);

        let metals = metals_table(&holdings.metals);
        assert!(metals.contains("10 oz silver bar"));
        assert!(metals.contains("$310.00"));

        let coins = coins_table(&holdings.coins);
        assert!(coins.contains("Morgan Dollar 1921"));
        assert!(coins.contains("$42.00"));

        let goldbacks = goldbacks_table(&holdings.goldbacks, &snapshot);
        assert!(goldbacks.contains("1/2"));
        assert!(goldbacks.contains("$400.00"));

        assert_eq!(
            metals_table(&[]),
            "No bulk metal holdings configured.".to_string()
        );
    }

    #[test]
    fn test_spot_banner() {
        let banner = spot_banner(&snapshot_with_gold(2412.35));
        assert!(banner.contains("gold $2412.35"));
        assert!(banner.contains("silver $30.00"));
        assert!(banner.contains("never"));
    }
}
