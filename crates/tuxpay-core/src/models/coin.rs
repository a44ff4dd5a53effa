use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A payment coin enabled on the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Coin {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub decimals: Option<u32>,
    /// Current fee rate in sats/byte
    #[serde(default)]
    pub fee_rate: Option<f64>,
    /// Estimated fee in USD for a one-input, two-output transaction
    #[serde(default)]
    pub fee_estimate: Option<f64>,
    /// Base64-encoded SVG icon
    #[serde(default)]
    pub icon: Option<String>,
}

/// Response of `GET /coins`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CoinsResponse {
    #[serde(default)]
    pub coins: Vec<Coin>,
    /// Fiat exchange rates, USD to currency
    #[serde(default)]
    pub currencies: BTreeMap<String, f64>,
}

impl CoinsResponse {
    pub fn find(&self, symbol: &str) -> Option<&Coin> {
        self.coins
            .iter()
            .find(|c| c.symbol.eq_ignore_ascii_case(symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coins_response() {
        let json = r#"{"currencies": {"USD": 1.0, "CAD": 1.31},
            "coins": [{"symbol": "BTC", "name": "Bitcoin", "decimals": 8, "fee_rate": 1,
                       "fee_estimate": 0.13, "icon": "PHN2Zz48L3N2Zz4="}]}"#;
        let coins: CoinsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(coins.currencies.get("CAD"), Some(&1.31));
        assert_eq!(coins.find("btc").map(|c| c.name.as_str()), Some("Bitcoin"));
        assert!(coins.find("LTC").is_none());
    }
}
