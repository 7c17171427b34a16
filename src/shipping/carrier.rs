//! Carriers and their weight-tiered rate tables.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::value_objects::Weight;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CarrierCode {
    Ghn,
    Ghtk,
    Vnpost,
    Shop,
}

impl CarrierCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ghn => "GHN",
            Self::Ghtk => "GHTK",
            Self::Vnpost => "VNPOST",
            Self::Shop => "SHOP",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GHN" => Some(Self::Ghn),
            "GHTK" => Some(Self::Ghtk),
            "VNPOST" => Some(Self::Vnpost),
            "SHOP" => Some(Self::Shop),
            _ => None,
        }
    }
}

impl fmt::Display for CarrierCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Weight bands in grams with their fee; weights past the last band pay
/// the last fee plus a surcharge per started kilogram above it.
#[derive(Clone, Debug)]
pub struct RateTable {
    bands: Vec<(u32, Decimal)>,
    per_extra_kg: Decimal,
}

impl RateTable {
    pub fn new(bands: Vec<(u32, Decimal)>, per_extra_kg: Decimal) -> Self {
        Self { bands, per_extra_kg }
    }

    /// Standard Vietnamese courier bands: 0.5 kg, 1 kg, 2 kg, 5 kg.
    fn standard(fees: [i64; 4], per_extra_kg: Decimal) -> Self {
        let limits = [500, 1_000, 2_000, 5_000];
        Self::new(limits.into_iter().zip(fees.map(Decimal::from)).collect(), per_extra_kg)
    }

    /// Base fee for a parcel. A zero weight still pays the first band.
    pub fn base_cost(&self, weight: Weight) -> Decimal {
        if let Some((_, fee)) = self.bands.iter().find(|(limit, _)| weight.as_grams() <= *limit) {
            return *fee;
        }
        let Some(&(last_limit, last_fee)) = self.bands.last() else { return Decimal::ZERO };
        let extra_kg = weight.ceil_kg().saturating_sub(Weight::grams(last_limit).ceil_kg());
        last_fee + self.per_extra_kg * Decimal::from(extra_kg)
    }
}

#[derive(Clone, Debug)]
pub struct Carrier {
    pub code: CarrierCode,
    pub name: String,
    pub estimated_days: u32,
    pub tracking: bool,
    pub rates: RateTable,
}

/// The carriers offered at checkout.
pub fn default_carriers() -> Vec<Carrier> {
    vec![
        Carrier {
            code: CarrierCode::Ghn, name: "Giao Hàng Nhanh".into(), estimated_days: 2, tracking: true,
            rates: RateTable::standard([22_000, 27_000, 32_000, 45_000], Decimal::from(5_000)),
        },
        Carrier {
            code: CarrierCode::Ghtk, name: "Giao Hàng Tiết Kiệm".into(), estimated_days: 3, tracking: true,
            rates: RateTable::standard([18_000, 22_000, 28_000, 40_000], Decimal::from(4_000)),
        },
        Carrier {
            code: CarrierCode::Vnpost, name: "Bưu điện Việt Nam".into(), estimated_days: 5, tracking: true,
            rates: RateTable::standard([16_000, 20_000, 25_000, 35_000], Decimal::from(3_500)),
        },
        Carrier {
            code: CarrierCode::Shop, name: "Shop tự giao".into(), estimated_days: 1, tracking: false,
            rates: RateTable::standard([15_000, 20_000, 30_000, 50_000], Decimal::from(8_000)),
        },
    ]
}
