//! Conversion of scalar literal text into typed values.
//!
//! The lexer has already checked the shape of every literal; what can still
//! fail here is range: integers beyond `i64`, month 13, February 30.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::TomlError;

fn strip_underscores(text: &str) -> String {
    text.chars().filter(|c| *c != '_').collect()
}

pub fn integer(text: &str) -> Result<i64, TomlError> {
    let digits = strip_underscores(text);
    let parsed = if let Some(hex) = digits.strip_prefix("0x") {
        i64::from_str_radix(hex, 16)
    } else if let Some(oct) = digits.strip_prefix("0o") {
        i64::from_str_radix(oct, 8)
    } else if let Some(bin) = digits.strip_prefix("0b") {
        i64::from_str_radix(bin, 2)
    } else {
        digits.parse::<i64>()
    };

    parsed.map_err(|err| TomlError::InvalidInteger {
        text: text.to_string(),
        reason: err.to_string(),
    })
}

pub fn float(text: &str) -> Result<f64, TomlError> {
    let digits = strip_underscores(text);
    match digits.as_str() {
        "inf" | "+inf" => Ok(f64::INFINITY),
        "-inf" => Ok(f64::NEG_INFINITY),
        "nan" | "+nan" => Ok(f64::NAN),
        "-nan" => Ok(-f64::NAN),
        other => other.parse::<f64>().map_err(|_| TomlError::InvalidFloat {
            text: text.to_string(),
        }),
    }
}

// ANCHOR: date_time
const DATE: &str = "%Y-%m-%d";
const TIME: &str = "%H:%M:%S%.f";
const DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Accepts `t` or a space between date and time and a lowercase `z`.
fn normalise(text: &str) -> String {
    let mut normalised = text.to_string();
    if matches!(normalised.get(10..11), Some(" " | "t")) {
        normalised.replace_range(10..11, "T");
    }
    if normalised.ends_with('z') {
        normalised.pop();
        normalised.push('Z');
    }
    normalised
}

fn date_time_error(text: &str, err: chrono::ParseError) -> TomlError {
    TomlError::InvalidDateTime {
        text: text.to_string(),
        reason: err.to_string(),
    }
}

pub fn offset_date_time(text: &str) -> Result<DateTime<FixedOffset>, TomlError> {
    DateTime::parse_from_rfc3339(&normalise(text)).map_err(|err| date_time_error(text, err))
}

pub fn local_date_time(text: &str) -> Result<NaiveDateTime, TomlError> {
    NaiveDateTime::parse_from_str(&normalise(text), DATE_TIME)
        .map_err(|err| date_time_error(text, err))
}

pub fn local_date(text: &str) -> Result<NaiveDate, TomlError> {
    NaiveDate::parse_from_str(text, DATE).map_err(|err| date_time_error(text, err))
}

pub fn local_time(text: &str) -> Result<NaiveTime, TomlError> {
    NaiveTime::parse_from_str(text, TIME).map_err(|err| date_time_error(text, err))
}
// ANCHOR_END: date_time

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("42", 42 ; "decimal")]
    #[test_case("+17", 17 ; "plus sign")]
    #[test_case("-1_000", -1000 ; "underscores")]
    #[test_case("0xDEAD_beef", 0xDEAD_BEEF ; "hex")]
    #[test_case("0o755", 0o755 ; "octal")]
    #[test_case("0b1101", 0b1101 ; "binary")]
    #[test_case("-9223372036854775808", i64::MIN ; "min")]
    fn integers(text: &str, expected: i64) {
        assert_eq!(integer(text).unwrap(), expected);
    }

    #[test_case("9223372036854775808" ; "decimal overflow")]
    #[test_case("0x8000000000000000" ; "hex overflow")]
    fn integer_overflow(text: &str) {
        assert!(matches!(
            integer(text),
            Err(TomlError::InvalidInteger { .. })
        ));
    }

    #[test_case("3.25", 3.25 ; "fraction")]
    #[test_case("-0.01", -0.01 ; "negative")]
    #[test_case("5e+22", 5e22 ; "exponent")]
    #[test_case("6.626e-34", 6.626e-34 ; "fraction and exponent")]
    #[test_case("224_617.445_991", 224_617.445_991 ; "underscores")]
    #[test_case("-inf", f64::NEG_INFINITY ; "negative infinity")]
    fn floats(text: &str, expected: f64) {
        assert_eq!(float(text).unwrap(), expected);
    }

    #[test]
    fn nan_keeps_its_sign() {
        assert!(float("nan").unwrap().is_nan());
        assert!(float("-nan").unwrap().is_sign_negative());
    }

    #[test_case("1979-05-27T07:32:00Z" ; "utc")]
    #[test_case("1979-05-27 07:32:00z" ; "space and lowercase z")]
    #[test_case("1979-05-27t00:32:00.999999-07:00" ; "lowercase t with fraction")]
    fn offset_date_times(text: &str) {
        assert!(offset_date_time(text).is_ok());
    }

    #[test]
    fn offset_is_kept() {
        let dt = offset_date_time("1979-05-27T00:32:00-07:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), -7 * 3600);
    }

    #[test]
    fn local_forms() {
        assert!(local_date_time("1979-05-27T07:32:00").is_ok());
        assert!(local_date_time("1979-05-27 07:32:00.5").is_ok());
        assert!(local_date("1979-05-27").is_ok());
        assert!(local_time("00:32:00.999999").is_ok());
    }

    #[test_case("1979-13-27" ; "month 13")]
    #[test_case("2023-02-30" ; "february 30")]
    fn out_of_range_dates(text: &str) {
        assert!(matches!(
            local_date(text),
            Err(TomlError::InvalidDateTime { .. })
        ));
    }

    #[test]
    fn out_of_range_time() {
        assert!(local_time("25:00:00").is_err());
    }
}
