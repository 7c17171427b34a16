//! Tracking numbers and delivery estimates.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::CarrierCode;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingNumber(String);

impl TrackingNumber {
    /// Carrier code, `yyMMdd` of `now`, then six random digits, e.g. `GHN241019042731`.
    pub fn generate(carrier: CarrierCode, now: DateTime<Utc>) -> Self {
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
        Self(format!("{}{}{:06}", carrier.as_str(), now.format("%y%m%d"), suffix))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

pub fn estimated_delivery(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now + Duration::days(i64::from(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_tracking_number_shape() {
        let now = Utc.with_ymd_and_hms(2024, 10, 19, 8, 0, 0).unwrap();
        let t = TrackingNumber::generate(CarrierCode::Ghtk, now);
        assert!(t.as_str().starts_with("GHTK241019"));
        assert_eq!(t.as_str().len(), "GHTK241019".len() + 6);
        assert!(t.as_str()[4..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_estimated_delivery() {
        let now = Utc.with_ymd_and_hms(2024, 12, 30, 0, 0, 0).unwrap();
        assert_eq!(estimated_delivery(now, 3), Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap());
    }
}
