use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Behavioral features for one task attempt, as posted to `/predict`.
///
/// Every field is an integer. Values are accepted leniently (see
/// [`lenient_int`]) and passed to the model without range checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PredictionRequest {
    #[serde(default, deserialize_with = "lenient_int")]
    pub task_complexity_low: i64,
    #[serde(default, deserialize_with = "lenient_int")]
    pub task_complexity_medium: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub start_delay_min: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub last_minute_rush: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub focus_rating: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub distractions_count: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub coffee_intake_mg: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub task_quality_score: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub stress_level: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub procrastination_prediction: i64,
    pub risk_score: f64,
}

/// Accepts `7`, `7.0`, `"7"`, `"7.0"`, `"1_000"` and booleans as integers.
///
/// Fractional floats, non-numeric strings and `null` are rejected.
pub fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientInt;

    impl<'de> de::Visitor<'de> for LenientInt {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer, an integral float or a numeric string")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<i64, E> {
            Ok(v as i64)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
            if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
                Ok(v as i64)
            } else {
                Err(E::invalid_value(de::Unexpected::Float(v), &self))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            parse_int_text(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    deserializer.deserialize_any(LenientInt)
}

/// Integer text as Python's `int()` reads it, plus a zero-only decimal tail:
/// `" 42 "`, `"1_000"`, `"3.0"`, `"3."`.
fn parse_int_text(s: &str) -> Option<i64> {
    let s = s.trim();
    let s = match s.split_once('.') {
        Some((int, frac)) if frac.bytes().all(|b| b == b'0') => int,
        Some(_) => return None,
        None => s,
    };

    let bytes = s.as_bytes();
    let mut digits = String::with_capacity(s.len());
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'_' {
            digits.push(b as char);
            continue;
        }
        // a single underscore, only between two digits
        let prev = i > 0 && bytes[i - 1].is_ascii_digit();
        let next = bytes.get(i + 1).is_some_and(|n| n.is_ascii_digit());
        if !(prev && next) {
            return None;
        }
    }
    digits.parse().ok()
}
