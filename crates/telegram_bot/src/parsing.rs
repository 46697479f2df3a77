use engine::normalize_commodity;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Amount {
    /// Value in hundredths of the commodity.
    pub minor: i64,
    /// Commodity typed next to the number, overrides the user's default.
    pub currency: Option<String>,
}

impl Amount {
    /// The amount as it leaves the source account, e.g. `-12.50`.
    pub(crate) fn negated(&self) -> String {
        format!("-{}.{:02}", self.minor / 100, self.minor % 100)
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum AmountError {
    #[error("the amount is empty")]
    Empty,
    #[error("'{0}' is not a valid amount")]
    Invalid(String),
    #[error("the amount must be greater than zero")]
    NotPositive,
    #[error("at most two decimal places are supported")]
    TooManyDecimals,
    #[error("'{0}' is not a valid currency")]
    InvalidCurrency(String),
}

/// Parses the amount of a transaction.
///
/// Accepted forms:
/// - `12`, `12.5`, `12.50`, `12,50`, `+12.50`
/// - any of the above followed by a commodity: `12.50 usd`
pub(crate) fn parse_amount(input: &str) -> Result<Amount, AmountError> {
    let mut tokens = input.split_whitespace();
    let number = tokens.next().ok_or(AmountError::Empty)?;
    let currency = tokens.next().map(parse_currency).transpose()?;
    if tokens.next().is_some() {
        return Err(AmountError::Invalid(input.trim().to_string()));
    }

    let invalid = || AmountError::Invalid(number.to_string());
    if number.starts_with('-') {
        return Err(AmountError::NotPositive);
    }
    let normalized = number.trim_start_matches('+').replace(',', ".");

    let (int_part, frac_part) = match normalized.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (normalized.as_str(), ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }
    if frac_part.len() > 2 {
        return Err(AmountError::TooManyDecimals);
    }

    let int_value: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| invalid())?
    };
    let frac_value: i64 = match frac_part.len() {
        0 => 0,
        1 => frac_part.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => frac_part.parse().map_err(|_| invalid())?,
    };
    let minor = int_value
        .checked_mul(100)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(invalid)?;
    if minor == 0 {
        return Err(AmountError::NotPositive);
    }

    Ok(Amount { minor, currency })
}

fn parse_currency(raw: &str) -> Result<String, AmountError> {
    normalize_commodity(raw).map_err(|_| AmountError::InvalidCurrency(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_dot_or_comma() {
        assert_eq!(parse_amount("12.50").unwrap().minor, 1250);
        assert_eq!(parse_amount("12,5").unwrap().minor, 1250);
        assert_eq!(parse_amount("7").unwrap().minor, 700);
        assert_eq!(parse_amount("+0.01").unwrap().minor, 1);
        assert_eq!(parse_amount(" .5 ").unwrap().minor, 50);
    }

    #[test]
    fn currency_is_optional_and_uppercased() {
        let amount = parse_amount("17.34 usd").unwrap();
        assert_eq!(amount.minor, 1734);
        assert_eq!(amount.currency.as_deref(), Some("USD"));
        assert_eq!(parse_amount("17.34").unwrap().currency, None);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse_amount("   "), Err(AmountError::Empty));
        assert_eq!(parse_amount("-3"), Err(AmountError::NotPositive));
        assert_eq!(parse_amount("0,00"), Err(AmountError::NotPositive));
        assert_eq!(parse_amount("1.234"), Err(AmountError::TooManyDecimals));
        assert_eq!(
            parse_amount("abc"),
            Err(AmountError::Invalid("abc".to_string()))
        );
        assert_eq!(
            parse_amount("1.2.3"),
            Err(AmountError::Invalid("1.2.3".to_string()))
        );
        assert_eq!(
            parse_amount("5 EUR extra"),
            Err(AmountError::Invalid("5 EUR extra".to_string()))
        );
        assert_eq!(
            parse_amount("5 €"),
            Err(AmountError::InvalidCurrency("€".to_string()))
        );
        assert_eq!(
            parse_amount("5 EUR-"),
            Err(AmountError::InvalidCurrency("EUR-".to_string()))
        );
        assert_eq!(
            parse_amount(&format!("5 {}", "A".repeat(25))),
            Err(AmountError::InvalidCurrency("A".repeat(25)))
        );
    }

    #[test]
    fn negated_keeps_two_decimals() {
        assert_eq!(parse_amount("12.5").unwrap().negated(), "-12.50");
        assert_eq!(parse_amount("0.07").unwrap().negated(), "-0.07");
        assert_eq!(parse_amount("1000").unwrap().negated(), "-1000.00");
    }
}
