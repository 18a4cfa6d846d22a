use serde::{Deserialize, Serialize};

/// The currencies an expense can be recorded in.
///
/// Selecting a currency only filters which expenses are shown and totalled. Amounts are never
/// converted between currencies.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
#[value(rename_all = "UPPER")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Jpy,
    Sek,
}

serde_plain::derive_display_from_serialize!(Currency);
serde_plain::derive_fromstr_from_deserialize!(Currency);

impl Currency {
    /// Every supported currency, in the order they are offered to the user.
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Jpy,
        Currency::Sek,
    ];

    /// The uppercase code, e.g. `"USD"`.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Sek => "SEK",
        }
    }

    /// The glyph shown in front of amounts.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Jpy => "¥",
            Currency::Sek => "kr",
        }
    }

    /// Looks up a currency by its code, ignoring surrounding whitespace and case.
    pub fn from_code(code: &str) -> Option<Currency> {
        let code = code.trim();
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_codes_match_serde() {
        for c in Currency::ALL {
            assert_eq!(c.to_string(), c.code());
            assert_eq!(Currency::from_str(c.code()).unwrap(), c);
        }
    }

    #[test]
    fn test_json() {
        assert_eq!(serde_json::to_string(&Currency::Gbp).unwrap(), "\"GBP\"");
        let c: Currency = serde_json::from_str("\"SEK\"").unwrap();
        assert_eq!(c, Currency::Sek);
        assert!(serde_json::from_str::<Currency>("\"CAD\"").is_err());
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Currency::from_code(" eur "), Some(Currency::Eur));
        assert_eq!(Currency::from_code("XYZ"), None);
    }

    #[test]
    fn test_default_is_usd() {
        assert_eq!(Currency::default(), Currency::Usd);
        assert_eq!(Currency::default().symbol(), "$");
    }
}
