use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::de;
use serde::de::SeqAccess;
use serde::de::Visitor;

use crate::fixed_point::FixedPoint;
use crate::fixed_point::parse_decimal;

struct FixedPointVisitor;

impl<'de> Visitor<'de> for FixedPointVisitor {
    type Value = FixedPoint;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number or decimal string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<FixedPoint, E> {
        parse_decimal(value).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<FixedPoint, E> {
        FixedPoint::from_int(value).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<FixedPoint, E> {
        let value = i64::try_from(value).map_err(E::custom)?;
        FixedPoint::from_int(value).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<FixedPoint, E> {
        parse_decimal(&value.to_string()).map_err(E::custom)
    }
}

/// Kraken sends amounts as JSON strings ("0.2500000000"); plain numbers are accepted too
impl<'de> Deserialize<'de> for FixedPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(FixedPointVisitor)
    }
}

/// Deserialize the first element of a `[value, ...]` array
///
/// Ticker fields such as `c` are `[price, lot volume]`; only the price matters.
pub fn deserialize_first_fixed_point<'de, D>(deserializer: D) -> Result<FixedPoint, D::Error>
where
    D: Deserializer<'de>,
{
    struct FirstVisitor;

    impl<'de> Visitor<'de> for FirstVisitor {
        type Value = FixedPoint;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-empty array of decimal strings")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<FixedPoint, A::Error> {
            let first: FixedPoint = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(0, &self))?;
            // Drain the rest so the deserializer is left in a consistent state
            while seq.next_element::<de::IgnoredAny>()?.is_some() {}
            Ok(first)
        }
    }

    deserializer.deserialize_seq(FirstVisitor)
}
