//! Province lookup and distance tiers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    North,
    Central,
    South,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Province {
    pub name: &'static str,
    pub region: Region,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceTier {
    SameProvince,
    SameRegion,
    CrossRegion,
}

impl DistanceTier {
    pub fn between(origin: &Province, destination: &Province) -> Self {
        if origin.name == destination.name {
            Self::SameProvince
        } else if origin.region == destination.region {
            Self::SameRegion
        } else {
            Self::CrossRegion
        }
    }

    pub fn factor(&self) -> Decimal {
        match self {
            Self::SameProvince => Decimal::ONE,
            Self::SameRegion => Decimal::new(13, 1),
            Self::CrossRegion => Decimal::new(16, 1),
        }
    }
}

// (canonical name, region, extra lowercase aliases)
const PROVINCES: &[(&str, Region, &[&str])] = &[
    ("Hà Nội", Region::North, &["ha noi", "hanoi"]),
    ("Hải Phòng", Region::North, &["hai phong"]),
    ("Quảng Ninh", Region::North, &["quang ninh"]),
    ("Bắc Ninh", Region::North, &["bac ninh"]),
    ("Hải Dương", Region::North, &["hai duong"]),
    ("Hưng Yên", Region::North, &["hung yen"]),
    ("Thái Nguyên", Region::North, &["thai nguyen"]),
    ("Nam Định", Region::North, &["nam dinh"]),
    ("Ninh Bình", Region::North, &["ninh binh"]),
    ("Lào Cai", Region::North, &["lao cai"]),
    ("Thanh Hóa", Region::Central, &["thanh hoa", "thanh hoá"]),
    ("Nghệ An", Region::Central, &["nghe an"]),
    ("Huế", Region::Central, &["hue", "thừa thiên huế", "thua thien hue"]),
    ("Đà Nẵng", Region::Central, &["da nang", "danang"]),
    ("Quảng Nam", Region::Central, &["quang nam"]),
    ("Bình Định", Region::Central, &["binh dinh"]),
    ("Khánh Hòa", Region::Central, &["khanh hoa", "khánh hoà", "nha trang"]),
    ("Lâm Đồng", Region::Central, &["lam dong", "đà lạt", "da lat"]),
    ("Đắk Lắk", Region::Central, &["dak lak", "đắc lắc"]),
    ("Hồ Chí Minh", Region::South, &["ho chi minh", "hcm", "sài gòn", "sai gon", "saigon", "tphcm"]),
    ("Bình Dương", Region::South, &["binh duong"]),
    ("Đồng Nai", Region::South, &["dong nai"]),
    ("Bà Rịa - Vũng Tàu", Region::South, &["ba ria - vung tau", "bà rịa vũng tàu", "vũng tàu", "vung tau"]),
    ("Long An", Region::South, &["long an"]),
    ("Cần Thơ", Region::South, &["can tho"]),
    ("An Giang", Region::South, &["an giang"]),
    ("Kiên Giang", Region::South, &["kien giang", "phú quốc", "phu quoc"]),
    ("Tiền Giang", Region::South, &["tien giang"]),
    ("Cà Mau", Region::South, &["ca mau"]),
];

const PREFIXES: &[&str] = &["thành phố ", "thanh pho ", "tp. ", "tp.", "tp ", "tỉnh ", "tinh "];

fn normalize(input: &str) -> String {
    let mut s = input.trim().to_lowercase();
    for prefix in PREFIXES {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest.trim().to_string();
            break;
        }
    }
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves a free-form province/city name, with or without diacritics.
pub fn resolve_province(input: &str) -> Option<Province> {
    let key = normalize(input);
    if key.is_empty() { return None; }
    PROVINCES
        .iter()
        .find(|(name, _, aliases)| name.to_lowercase() == key || aliases.contains(&key.as_str()))
        .map(|&(name, region, _)| Province { name, region })
}
