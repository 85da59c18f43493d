//! Pure valuation and display formulas
//!
//! Everything here is a function of its arguments; price lookups happen at
//! the call site against a [`crate::spot::PriceSnapshot`].

/// Thousandths of a troy ounce of gold content per denomination unit.
const GOLDBACK_CONTENT_DIVISOR: f64 = 1000.0;

/// Fixed market premium over melt value for Goldback notes. Not derived from
/// any feed.
const GOLDBACK_PREMIUM: f64 = 2.0;

/// Tolerance when matching a decimal against the fraction table.
const FRACTION_TOLERANCE: f64 = 1e-4;

const FRACTIONS: [(f64, &str); 7] = [
    (0.5, "1/2"),
    (0.25, "1/4"),
    (0.1, "1/10"),
    (0.05, "1/20"),
    (0.02, "1/50"),
    (0.01, "1/100"),
    (0.005, "1/200"),
];

/// Worth of a batch of Goldback notes at the given gold spot price.
/// Recomputed on every read; a missing price values the batch at zero.
pub fn goldback_worth(denomination: f64, count: u32, gold_price: Option<f64>) -> f64 {
    match gold_price {
        Some(price) => {
            denomination / GOLDBACK_CONTENT_DIVISOR * price * GOLDBACK_PREMIUM * count as f64
        }
        None => 0.0,
    }
}

/// Total face-value units in a batch.
pub fn goldback_units(denomination: f64, count: u32) -> f64 {
    denomination * count as f64
}

pub fn gain_loss(current_value: f64, cost_basis: f64) -> f64 {
    current_value - cost_basis
}

/// Gain/loss as a percentage of cost basis. Zero when there is no basis to
/// divide by.
pub fn gain_loss_percent(current_value: f64, cost_basis: f64) -> f64 {
    if cost_basis > 0.0 {
        (current_value - cost_basis) / cost_basis * 100.0
    } else {
        0.0
    }
}

/// Troy-ounce weight for display: common fractional sizes render as "1/10"
/// style fractions, everything else trimmed to at most six decimals.
pub fn format_weight(weight: f64) -> String {
    fraction_or_trimmed(weight, 6)
}

/// Goldback denomination for display: halves and quarters render as
/// fractions, everything else trimmed to at most two decimals.
pub fn format_denomination(denomination: f64) -> String {
    fraction_or_trimmed(denomination, 2)
}

fn fraction_or_trimmed(value: f64, max_decimals: usize) -> String {
    for (decimal, fraction) in FRACTIONS {
        if (value - decimal).abs() < FRACTION_TOLERANCE {
            return fraction.to_string();
        }
    }
    let formatted = format!("{value:.max_decimals$}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
