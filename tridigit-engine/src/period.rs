use chrono::{Duration, NaiveDateTime};

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const TIMESTAMP_LEN: usize = 14;
const OPAQUE_SUFFIX: &str = "_next";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodFormat {
    /// `YYYYMMDDHHMMSS`, un tirage par minute.
    Timestamp,
    /// Compteur numérique, zéros de tête conservés.
    Sequential,
    Opaque,
}

impl PeriodFormat {
    pub fn sniff(period: &str) -> Self {
        if period.is_empty() || !period.bytes().all(|b| b.is_ascii_digit()) {
            PeriodFormat::Opaque
        } else if period.len() == TIMESTAMP_LEN
            && NaiveDateTime::parse_from_str(period, TIMESTAMP_FORMAT).is_ok()
        {
            PeriodFormat::Timestamp
        } else {
            PeriodFormat::Sequential
        }
    }
}

/// Période du tirage suivant.
pub fn next_period(period: &str) -> String {
    match PeriodFormat::sniff(period) {
        PeriodFormat::Timestamp => match NaiveDateTime::parse_from_str(period, TIMESTAMP_FORMAT) {
            Ok(ts) => (ts + Duration::minutes(1)).format(TIMESTAMP_FORMAT).to_string(),
            Err(_) => increment_digits(period),
        },
        PeriodFormat::Sequential => increment_digits(period),
        PeriodFormat::Opaque => format!("{}{}", period, OPAQUE_SUFFIX),
    }
}

/// +1 décimal sur une chaîne de chiffres de longueur quelconque.
/// La largeur est conservée sauf débordement (`999` -> `1000`).
fn increment_digits(period: &str) -> String {
    let mut digits: Vec<u8> = period.bytes().collect();
    for b in digits.iter_mut().rev() {
        if *b == b'9' {
            *b = b'0';
        } else {
            *b += 1;
            return String::from_utf8_lossy(&digits).into_owned();
        }
    }
    let mut out = String::with_capacity(digits.len() + 1);
    out.push('1');
    out.push_str(&String::from_utf8_lossy(&digits));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff() {
        assert_eq!(PeriodFormat::sniff("20240101120000"), PeriodFormat::Timestamp);
        assert_eq!(PeriodFormat::sniff("2024001"), PeriodFormat::Sequential);
        assert_eq!(PeriodFormat::sniff("99999999999999"), PeriodFormat::Sequential);
        assert_eq!(PeriodFormat::sniff("A-12"), PeriodFormat::Opaque);
        assert_eq!(PeriodFormat::sniff(""), PeriodFormat::Opaque);
    }

    #[test]
    fn test_next_timestamp_adds_one_minute() {
        assert_eq!(next_period("20240101120000"), "20240101120100");
        assert_eq!(next_period("20231231235900"), "20240101000000");
    }

    #[test]
    fn test_next_sequential_keeps_padding() {
        assert_eq!(next_period("001"), "002");
        assert_eq!(next_period("0099"), "0100");
        assert_eq!(next_period("999"), "1000");
        assert_eq!(next_period("10"), "11");
    }

    #[test]
    fn test_next_sequential_beyond_u64() {
        assert_eq!(next_period("123456789012345678901234"), "123456789012345678901235");
    }

    #[test]
    fn test_next_opaque() {
        assert_eq!(next_period("abc"), "abc_next");
    }
}
