//! Holding models for the three asset categories

use serde::{Deserialize, Serialize};

/// Bars, rounds and other bulk metal. `current_value` is revalued by hand
/// when the owner chooses to; it is not derived from the spot cache.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BulkMetal {
    pub name: String,
    pub metal: String,
    pub weight_oz: f64,
    pub purity: f64,
    pub cost_basis: f64,
    pub current_value: f64,
}

/// A world coin tracked at numismatic value. `worth` is entered by hand and
/// never derived from the spot cache.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Coin {
    pub name: String,
    pub material: String,
    pub cost_basis: f64,
    pub worth: f64,
}

/// A batch of Goldback notes. There is no stored worth: it is recomputed
/// from the cached gold price on every read.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GoldbackNote {
    pub denomination: f64,
    pub count: u32,
    pub cost_basis: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Holdings {
    #[serde(default)]
    pub metals: Vec<BulkMetal>,
    #[serde(default)]
    pub coins: Vec<Coin>,
    #[serde(default)]
    pub goldbacks: Vec<GoldbackNote>,
}

impl Holdings {
    pub fn is_empty(&self) -> bool {
        self.metals.is_empty() && self.coins.is_empty() && self.goldbacks.is_empty()
    }
}
