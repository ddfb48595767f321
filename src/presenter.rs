//! Turns raw owned objects into display-ready airdrop records.
//!
//! Pure and infallible: missing metadata falls back to fixed labels, and the
//! amount is looked up through an ordered table of candidate content keys.

use serde::Serialize;

use crate::identifier::short_address;
use crate::query::RawOwnedObject;

/// Fixed-point scale of the airdropped token (9 decimals).
pub const AMOUNT_SCALE: u128 = 1_000_000_000;

pub const FALLBACK_NAME: &str = "WAL Airdrop";
pub const FALLBACK_DESCRIPTION: &str = "No description available";
pub const FALLBACK_IMAGE_URL: &str = "https://placehold.co/400x400?text=No+Image";

/// Content keys that have carried the amount across airdrop types, in priority order.
pub const DEFAULT_AMOUNT_FIELDS: &[&str] = &["amount", "balance", "value"];

/// Raw amount used when none of the candidate keys is present.
pub const DEFAULT_RAW_AMOUNT: u128 = 0;

/// Where to look for the raw on-chain amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountPolicy {
    candidates: Vec<String>,
    default_raw: u128,
}

impl Default for AmountPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_AMOUNT_FIELDS.iter().map(|s| s.to_string()).collect())
    }
}

impl AmountPolicy {
    pub fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            default_raw: DEFAULT_RAW_AMOUNT,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// First readable candidate, else the default raw amount.
    pub fn raw_amount(&self, fields: Option<&serde_json::Map<String, serde_json::Value>>) -> u128 {
        fields
            .and_then(|f| self.lookup(f))
            .unwrap_or(self.default_raw)
    }

    fn lookup(&self, fields: &serde_json::Map<String, serde_json::Value>) -> Option<u128> {
        self.candidates
            .iter()
            .filter_map(|key| fields.get(key))
            .find_map(|value| self.parse_raw(value))
    }

    fn parse_raw(&self, value: &serde_json::Value) -> Option<u128> {
        match value {
            // u64 amounts are serialized as decimal strings by the fullnode
            serde_json::Value::String(s) => s.trim().parse::<u128>().ok(),
            serde_json::Value::Number(n) => n.as_u64().map(u128::from),
            // nested Move struct, e.g. Balance<T> wrapped in its own `fields`
            serde_json::Value::Object(obj) => obj
                .get("fields")
                .and_then(|f| f.as_object())
                .and_then(|f| self.lookup(f)),
            _ => None,
        }
    }
}

/// Whole tokens: raw amount divided by the scale, rounded down.
pub fn scale_amount(raw: u128) -> u128 {
    raw / AMOUNT_SCALE
}

/// en-US grouping: `4216595` -> `4,216,595`.
pub fn format_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirdropRecord {
    pub object_id: String,
    pub short_object_id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    /// Whole tokens after scaling
    pub amount: u128,
    pub display_amount: String,
}

#[derive(Debug, Clone, Default)]
pub struct Presenter {
    policy: AmountPolicy,
}

impl Presenter {
    pub fn new(policy: AmountPolicy) -> Self {
        Self { policy }
    }

    /// Records in input order. Empty in, empty out.
    pub fn present(&self, objects: &[RawOwnedObject]) -> Vec<AirdropRecord> {
        objects.iter().map(|obj| self.record(obj)).collect()
    }

    fn record(&self, obj: &RawOwnedObject) -> AirdropRecord {
        let display = obj.display_fields();
        let pick = |field: Option<&String>, fallback: &str| {
            field
                .filter(|s| !s.is_empty())
                .cloned()
                .unwrap_or_else(|| fallback.to_string())
        };

        let amount = scale_amount(self.policy.raw_amount(obj.content_fields()));

        AirdropRecord {
            object_id: obj.object_id.clone(),
            short_object_id: short_address(&obj.object_id),
            name: pick(display.and_then(|d| d.name.as_ref()), FALLBACK_NAME),
            description: pick(
                display.and_then(|d| d.description.as_ref()),
                FALLBACK_DESCRIPTION,
            ),
            image_url: pick(display.and_then(|d| d.image_url.as_ref()), FALLBACK_IMAGE_URL),
            amount,
            display_amount: format_thousands(amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: serde_json::Value) -> RawOwnedObject {
        serde_json::from_value(value).unwrap()
    }

    fn with_fields(fields: serde_json::Value) -> RawOwnedObject {
        object(json!({
            "objectId": "0x5f3c1a0e9d2b4c6a8e7f1d3b5a7c9e0f2d4b6a8c",
            "content": { "dataType": "moveObject", "fields": fields }
        }))
    }

    #[test]
    fn test_amount_scaling() {
        let presenter = Presenter::default();
        let records = presenter.present(&[
            with_fields(json!({ "amount": "4216595000000000" })),
            with_fields(json!({ "amount": "0" })),
            with_fields(json!({ "amount": "999999999" })),
        ]);
        assert_eq!(records[0].amount, 4_216_595);
        assert_eq!(records[0].display_amount, "4,216,595");
        assert_eq!(records[1].amount, 0);
        assert_eq!(records[2].amount, 0);
    }

    #[test]
    fn test_missing_amount_uses_default() {
        let presenter = Presenter::default();
        let records = presenter.present(&[with_fields(json!({ "recipient": "0x1" })), object(json!({ "objectId": "0x2" }))]);
        assert_eq!(records[0].amount, scale_amount(DEFAULT_RAW_AMOUNT));
        assert_eq!(records[1].amount, scale_amount(DEFAULT_RAW_AMOUNT));
    }

    #[test]
    fn test_candidate_order_and_shapes() {
        let presenter = Presenter::default();
        let records = presenter.present(&[
            // earlier candidate wins
            with_fields(json!({ "balance": "7000000000", "amount": "2000000000" })),
            // unreadable earlier candidate is skipped
            with_fields(json!({ "amount": "-5", "balance": 3000000000u64 })),
            // nested Move struct
            with_fields(json!({ "balance": { "type": "0x2::balance::Balance", "fields": { "value": "5000000000" } } })),
        ]);
        assert_eq!(records[0].amount, 2);
        assert_eq!(records[1].amount, 3);
        assert_eq!(records[2].amount, 5);
    }

    #[test]
    fn test_custom_policy_extends_lookup() {
        let presenter = Presenter::new(AmountPolicy::new(vec![
            "allocation".to_string(),
            "amount".to_string(),
        ]));
        let records = presenter.present(&[with_fields(json!({ "allocation": "8000000000" }))]);
        assert_eq!(records[0].amount, 8);
    }

    #[test]
    fn test_display_fallbacks() {
        let presenter = Presenter::default();
        let records = presenter.present(&[
            object(json!({ "objectId": "0x1" })),
            object(json!({
                "objectId": "0x2",
                "display": { "data": { "name": "Test", "description": "", "image_url": "https://img/1.png" } }
            })),
        ]);
        assert_eq!(records[0].name, FALLBACK_NAME);
        assert_eq!(records[0].description, FALLBACK_DESCRIPTION);
        assert_eq!(records[0].image_url, FALLBACK_IMAGE_URL);
        assert_eq!(records[1].name, "Test");
        assert_eq!(records[1].description, FALLBACK_DESCRIPTION);
        assert_eq!(records[1].image_url, "https://img/1.png");
    }

    #[test]
    fn test_present_is_pure() {
        let presenter = Presenter::default();
        let input = vec![
            with_fields(json!({ "amount": "1000000000000" })),
            object(json!({ "objectId": "0x3" })),
        ];
        assert_eq!(presenter.present(&input), presenter.present(&input));
        assert!(presenter.present(&[]).is_empty());
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1_234_567_890), "1,234,567,890");
    }
}
