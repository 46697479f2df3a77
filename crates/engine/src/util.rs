//! Internal helpers for value validation.
//!
//! They keep the values written to the settings table valid Beancount syntax.
//! [`normalize_commodity`] is also used by the bot for amounts typed with a
//! commodity.

use crate::{EngineError, ResultEngine};

const MAX_CURRENCY_LEN: usize = 24;

/// Normalize a commodity to upper case and check it against Beancount's
/// commodity grammar: starts with a letter, ends with a letter or digit, at
/// most 24 characters, inner characters may also be `'._-`.
pub fn normalize_commodity(value: &str) -> ResultEngine<String> {
    let currency = value.trim().to_ascii_uppercase();
    let invalid = || EngineError::InvalidValue(format!("invalid currency: '{}'", value.trim()));

    let chars: Vec<char> = currency.chars().collect();
    let (Some(first), Some(last)) = (chars.first(), chars.last()) else {
        return Err(invalid());
    };
    if chars.len() > MAX_CURRENCY_LEN || !first.is_ascii_uppercase() {
        return Err(invalid());
    }
    if !(last.is_ascii_uppercase() || last.is_ascii_digit()) {
        return Err(invalid());
    }
    let inner_ok = chars
        .iter()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || "'._-".contains(*c));
    if !inner_ok {
        return Err(invalid());
    }
    Ok(currency)
}

/// Strip an optional leading `#` and check the tag only uses the characters
/// Beancount accepts in tags.
pub(crate) fn normalize_tag(value: &str) -> ResultEngine<String> {
    let tag = value.trim().trim_start_matches('#');
    if tag.is_empty()
        || !tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_/.".contains(c))
    {
        return Err(EngineError::InvalidValue(format!(
            "invalid tag: '{}'",
            value.trim()
        )));
    }
    Ok(tag.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_is_uppercased() {
        assert_eq!(normalize_commodity("eur").unwrap(), "EUR");
        assert_eq!(normalize_commodity(" usd ").unwrap(), "USD");
        assert_eq!(normalize_commodity("VACHR").unwrap(), "VACHR");
        assert_eq!(normalize_commodity("X").unwrap(), "X");
    }

    #[test]
    fn currency_rejects_invalid_commodities() {
        assert!(normalize_commodity("").is_err());
        assert!(normalize_commodity("1EUR").is_err());
        assert!(normalize_commodity("EUR-").is_err());
        assert!(normalize_commodity("EU R").is_err());
        assert!(normalize_commodity(&"A".repeat(25)).is_err());
    }

    #[test]
    fn tag_strips_hash() {
        assert_eq!(normalize_tag("#vacation2024").unwrap(), "vacation2024");
        assert_eq!(normalize_tag("trip/rome").unwrap(), "trip/rome");
    }

    #[test]
    fn tag_rejects_spaces_and_empty() {
        assert!(normalize_tag("#").is_err());
        assert!(normalize_tag("two words").is_err());
        assert!(normalize_tag("caffè").is_err());
    }
}
