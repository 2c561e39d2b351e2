//! Pure string/time transformations applied to pulled upstream values.

use crate::error::GenerateError;
use crate::value::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Case transformation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    Upper,
    Lower,
}

pub fn apply_case(input: &str, mode: CaseMode) -> String {
    match mode {
        CaseMode::Upper => input.to_uppercase(),
        CaseMode::Lower => input.to_lowercase(),
    }
}

/// Fold accented characters to their canonical 7-bit form using a locale
/// folding table (`ü` -> `ue`, `ß` -> `ss`), not bare Unicode decomposition.
/// Characters outside the table pass through unchanged.
pub fn fold_ascii(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match fold_char(c) {
            Some(folded) => out.push_str(folded),
            None => out.push(c),
        }
    }
    out
}

fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        // German umlauts and sharp s keep their digraph spelling
        'ä' => "ae",
        'ö' => "oe",
        'ü' => "ue",
        'Ä' => "Ae",
        'Ö' => "Oe",
        'Ü' => "Ue",
        'ß' => "ss",
        'à' | 'á' | 'â' | 'ã' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "A",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ė' | 'Ę' | 'Ě' => "E",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'Į' => "I",
        'ò' | 'ó' | 'ô' | 'õ' | 'ō' | 'ő' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ō' | 'Ő' => "O",
        'ù' | 'ú' | 'û' | 'ū' | 'ů' | 'ű' => "u",
        'Ù' | 'Ú' | 'Û' | 'Ū' | 'Ů' | 'Ű' => "U",
        'ç' | 'ć' | 'č' => "c",
        'Ç' | 'Ć' | 'Č' => "C",
        'ñ' | 'ń' | 'ň' => "n",
        'Ñ' | 'Ń' | 'Ň' => "N",
        'ý' | 'ÿ' => "y",
        'Ý' => "Y",
        'š' | 'ś' => "s",
        'Š' | 'Ś' => "S",
        'ž' | 'ź' | 'ż' => "z",
        'Ž' | 'Ź' | 'Ż' => "Z",
        'ď' | 'đ' => "d",
        'Ď' | 'Đ' => "D",
        'ť' => "t",
        'Ť' => "T",
        'ř' => "r",
        'Ř' => "R",
        'ł' => "l",
        'Ł' => "L",
        'æ' => "ae",
        'Æ' => "Ae",
        'œ' => "oe",
        'Œ' => "Oe",
        'ø' => "o",
        'Ø' => "O",
        'þ' => "th",
        'Þ' => "Th",
        'ð' => "d",
        'Ð' => "D",
        _ => return None,
    };
    Some(folded)
}

/// Substitute positional `{}` placeholders with rendered argument values,
/// in order. Surplus placeholders stay verbatim; surplus arguments are
/// ignored.
pub fn format_positional(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut next_arg = 0;
    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        match args.get(next_arg) {
            Some(arg) => {
                out.push_str(arg);
                next_arg += 1;
            }
            None => out.push_str("{}"),
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

/// Format a pulled value as a timestamp. Accepts `DateTime` values and
/// epoch-milli integers.
pub fn format_time(value: &Value, format: &str) -> Result<String, GenerateError> {
    let dt: DateTime<Utc> = match value {
        Value::DateTime(dt) => *dt,
        Value::Int64(ms) => DateTime::from_timestamp_millis(*ms)
            .ok_or_else(|| GenerateError::NotATimestamp(value.kind()))?,
        Value::Int32(ms) => DateTime::from_timestamp_millis(i64::from(*ms))
            .ok_or_else(|| GenerateError::NotATimestamp(value.kind()))?,
        other => return Err(GenerateError::NotATimestamp(other.kind())),
    };
    Ok(dt.format(format).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_modes() {
        assert_eq!(apply_case("MiXeD", CaseMode::Upper), "MIXED");
        assert_eq!(apply_case("MiXeD", CaseMode::Lower), "mixed");
    }

    #[test]
    fn test_fold_ascii_uses_locale_digraphs() {
        assert_eq!(fold_ascii("über"), "ueber");
        assert_eq!(fold_ascii("Äpfel"), "Aepfel");
        assert_eq!(fold_ascii("straße"), "strasse");
        assert_eq!(fold_ascii("Ærø"), "Aero");
    }

    #[test]
    fn test_fold_ascii_passes_plain_text_through() {
        assert_eq!(fold_ascii("plain ascii 123"), "plain ascii 123");
    }

    #[test]
    fn test_fold_ascii_covers_common_accents() {
        assert_eq!(fold_ascii("café naïve señor"), "cafe naive senor");
        assert_eq!(fold_ascii("Łódź"), "Lodz");
    }

    #[test]
    fn test_format_positional() {
        assert_eq!(
            format_positional("{}-{}", &["a".into(), "b".into()]),
            "a-b"
        );
        assert_eq!(format_positional("no placeholders", &["x".into()]), "no placeholders");
        assert_eq!(format_positional("{} and {}", &["one".into()]), "one and {}");
    }

    #[test]
    fn test_format_time_from_datetime() {
        let dt = DateTime::parse_from_rfc3339("2024-03-05T12:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let out = format_time(&Value::DateTime(dt), "%Y-%m-%d").unwrap();
        assert_eq!(out, "2024-03-05");
    }

    #[test]
    fn test_format_time_from_epoch_millis() {
        let out = format_time(&Value::Int64(0), "%Y-%m-%d %H:%M").unwrap();
        assert_eq!(out, "1970-01-01 00:00");
    }

    #[test]
    fn test_format_time_rejects_strings() {
        assert!(matches!(
            format_time(&Value::from("2024"), "%Y"),
            Err(GenerateError::NotATimestamp("string"))
        ));
    }
}
