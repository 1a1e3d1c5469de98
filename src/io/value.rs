//! Typed value codec.
//!
//! Converts a single [`PropertyValue`] to cell text and back. Decoding has no
//! schema to go on, so it infers the type by trying an ordered table of
//! parsers and keeping the first success:
//!
//! | Order | Type | Accepted text |
//! |-------|------|---------------|
//! | 1 | Integer | `i64` literal |
//! | 2 | Float | `f64` literal |
//! | 3 | Boolean | `true` / `false`, any case |
//! | 4 | Date | `YYYY-MM-DD` |
//! | 5 | Offset time | `HH:MM:SS[.f]±HH:MM` or `Z` |
//! | 6 | Local time | `HH:MM:SS[.f]` |
//! | 7 | Date-time | RFC 3339 with offset |
//! | 8 | Local date-time | `YYYY-MM-DDTHH:MM:SS[.f]` |
//! | 9 | Char | exactly one character |
//! | 10 | String | anything else |
//!
//! Strings that look like an earlier type are mis-typed on the way back in.
//! An offset time whose offset has a seconds part (`+01:00:30`) is written
//! as is but only minute offsets are accepted back, so it re-imports as a
//! string. Empty text means "no property" in both directions.

use crate::models::{OffsetTime, PropertyValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Leading or trailing quote left over from hand-edited cells.
static DEFENSIVE_QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(^\s")|(\s"\s?$)"#).unwrap_or_else(|_| unreachable!()));

/// One entry of the inference table.
#[derive(Clone, Copy)]
pub struct TypedParser {
    /// Name of the type this parser produces.
    pub kind: &'static str,
    /// Returns the value when the text has this type.
    pub parse: fn(&str) -> Option<PropertyValue>,
}

/// Inference table, in priority order. The string fallback is not listed.
pub const DECODE_ORDER: &[TypedParser] = &[
    TypedParser {
        kind: "integer",
        parse: parse_integer,
    },
    TypedParser {
        kind: "float",
        parse: parse_float,
    },
    TypedParser {
        kind: "boolean",
        parse: parse_boolean,
    },
    TypedParser {
        kind: "date",
        parse: parse_date,
    },
    TypedParser {
        kind: "offset_time",
        parse: parse_offset_time,
    },
    TypedParser {
        kind: "local_time",
        parse: parse_local_time,
    },
    TypedParser {
        kind: "date_time",
        parse: parse_date_time,
    },
    TypedParser {
        kind: "local_date_time",
        parse: parse_local_date_time,
    },
    TypedParser {
        kind: "char",
        parse: parse_char,
    },
];

/// Stateless encoder/decoder for cell values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCodec;

impl ValueCodec {
    /// Encodes a value as cell text.
    ///
    /// Returns `None` for values that encode to empty text; the caller writes
    /// an empty cell and the property is absent on re-import.
    #[must_use]
    pub fn encode(value: &PropertyValue) -> Option<String> {
        let text = match value {
            PropertyValue::Integer(v) => v.to_string(),
            // Debug keeps a decimal point or exponent, so the text stays a float.
            PropertyValue::Float(v) => format!("{v:?}"),
            PropertyValue::Boolean(v) => v.to_string(),
            PropertyValue::Char(v) => v.to_string(),
            PropertyValue::Date(v) => v.format(DATE_FORMAT).to_string(),
            PropertyValue::OffsetTime(v) => v.to_string(),
            PropertyValue::LocalTime(v) => v.format(TIME_FORMAT).to_string(),
            PropertyValue::DateTime(v) => v.to_rfc3339(),
            PropertyValue::LocalDateTime(v) => v.format(DATETIME_FORMAT).to_string(),
            PropertyValue::String(v) => v.clone(),
        };
        (!text.is_empty()).then_some(text)
    }

    /// Decodes cell text, inferring its type.
    ///
    /// Returns `None` for empty text.
    #[must_use]
    pub fn decode(text: &str) -> Option<PropertyValue> {
        if text.is_empty() {
            return None;
        }
        let value = DECODE_ORDER
            .iter()
            .find_map(|parser| (parser.parse)(text))
            .unwrap_or_else(|| PropertyValue::String(strip_defensive_quotes(text)));
        Some(value)
    }

    /// Returns the name of the type [`ValueCodec::decode`] would infer.
    #[must_use]
    pub fn infer_kind(text: &str) -> Option<&'static str> {
        if text.is_empty() {
            return None;
        }
        Some(
            DECODE_ORDER
                .iter()
                .find(|parser| (parser.parse)(text).is_some())
                .map_or("string", |parser| parser.kind),
        )
    }
}

fn strip_defensive_quotes(text: &str) -> String {
    DEFENSIVE_QUOTES.replace_all(text, "").into_owned()
}

fn parse_integer(text: &str) -> Option<PropertyValue> {
    text.parse::<i64>().ok().map(PropertyValue::Integer)
}

fn parse_float(text: &str) -> Option<PropertyValue> {
    text.parse::<f64>().ok().map(PropertyValue::Float)
}

fn parse_boolean(text: &str) -> Option<PropertyValue> {
    if text.eq_ignore_ascii_case("true") {
        Some(PropertyValue::Boolean(true))
    } else if text.eq_ignore_ascii_case("false") {
        Some(PropertyValue::Boolean(false))
    } else {
        None
    }
}

fn parse_date(text: &str) -> Option<PropertyValue> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .map(PropertyValue::Date)
}

fn parse_offset_time(text: &str) -> Option<PropertyValue> {
    text.parse::<OffsetTime>()
        .ok()
        .map(PropertyValue::OffsetTime)
}

fn parse_local_time(text: &str) -> Option<PropertyValue> {
    NaiveTime::parse_from_str(text, TIME_FORMAT)
        .ok()
        .map(PropertyValue::LocalTime)
}

fn parse_date_time(text: &str) -> Option<PropertyValue> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(PropertyValue::DateTime)
}

fn parse_local_date_time(text: &str) -> Option<PropertyValue> {
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .ok()
        .map(PropertyValue::LocalDateTime)
}

fn parse_char(text: &str) -> Option<PropertyValue> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(PropertyValue::Char(c)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use test_case::test_case;

    fn roundtrip(value: &PropertyValue) -> Option<PropertyValue> {
        ValueCodec::encode(value).and_then(|text| ValueCodec::decode(&text))
    }

    #[test_case("42", "integer" ; "integer")]
    #[test_case("-7", "integer" ; "negative integer")]
    #[test_case("3.5", "float" ; "float")]
    #[test_case("1e10", "float" ; "exponent float")]
    #[test_case("TRUE", "boolean" ; "upper boolean")]
    #[test_case("false", "boolean" ; "lower boolean")]
    #[test_case("2024-02-29", "date" ; "date")]
    #[test_case("10:15:30+01:00", "offset_time" ; "offset time")]
    #[test_case("10:15:30Z", "offset_time" ; "utc offset time")]
    #[test_case("10:15:30", "local_time" ; "local time")]
    #[test_case("2024-02-29T10:15:30+01:00", "date_time" ; "date time")]
    #[test_case("2024-02-29T10:15:30", "local_date_time" ; "local date time")]
    #[test_case("x", "char" ; "char")]
    #[test_case("Alice", "string" ; "string")]
    #[test_case("truthy", "string" ; "boolean prefix is a string")]
    fn test_inference_order(text: &str, expected: &str) {
        assert_eq!(ValueCodec::infer_kind(text), Some(expected));
    }

    #[test]
    fn test_empty_is_absent() {
        assert_eq!(ValueCodec::decode(""), None);
        assert_eq!(ValueCodec::encode(&PropertyValue::String(String::new())), None);
        assert_eq!(ValueCodec::infer_kind(""), None);
    }

    #[test]
    fn test_roundtrip_supported_types() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let time = NaiveTime::from_hms_milli_opt(10, 15, 30, 250).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let values = [
            PropertyValue::Integer(i64::MIN),
            PropertyValue::Float(1.0),
            PropertyValue::Float(-0.125),
            PropertyValue::Float(1e300),
            PropertyValue::Boolean(true),
            PropertyValue::Char('z'),
            PropertyValue::Date(date),
            PropertyValue::OffsetTime(OffsetTime::new(time, offset)),
            PropertyValue::LocalTime(time),
            PropertyValue::DateTime(date.and_time(time).and_local_timezone(offset).unwrap()),
            PropertyValue::LocalDateTime(date.and_time(time)),
            PropertyValue::String("Alice Smith".to_string()),
        ];
        for value in values {
            assert_eq!(roundtrip(&value), Some(value.clone()), "{value:?}");
        }
    }

    #[test]
    fn test_float_keeps_decimal_point() {
        assert_eq!(
            ValueCodec::encode(&PropertyValue::Float(2.0)).as_deref(),
            Some("2.0")
        );
    }

    #[test]
    fn test_documented_lossy_cases() {
        assert_eq!(
            roundtrip(&PropertyValue::Char('7')),
            Some(PropertyValue::Integer(7))
        );
        assert_eq!(
            roundtrip(&PropertyValue::String("2024".to_string())),
            Some(PropertyValue::Integer(2024))
        );
        assert_eq!(
            roundtrip(&PropertyValue::String("True".to_string())),
            Some(PropertyValue::Boolean(true))
        );

        let time = NaiveTime::from_hms_opt(10, 15, 30).unwrap();
        let odd_offset = FixedOffset::east_opt(3630).unwrap();
        let value = PropertyValue::OffsetTime(OffsetTime::new(time, odd_offset));
        assert_eq!(ValueCodec::encode(&value).as_deref(), Some("10:15:30+01:00:30"));
        assert_eq!(
            roundtrip(&value),
            Some(PropertyValue::String("10:15:30+01:00:30".to_string()))
        );
    }

    #[test]
    fn test_defensive_quotes_stripped() {
        assert_eq!(
            ValueCodec::decode(" \"hello world \""),
            Some(PropertyValue::String("hello world".to_string()))
        );
        assert_eq!(
            ValueCodec::decode("say \"hi\" now"),
            Some(PropertyValue::String("say \"hi\" now".to_string()))
        );
    }

    #[test]
    fn test_decode_order_is_complete() {
        let kinds: Vec<_> = DECODE_ORDER.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            [
                "integer",
                "float",
                "boolean",
                "date",
                "offset_time",
                "local_time",
                "date_time",
                "local_date_time",
                "char",
            ]
        );
    }
}
