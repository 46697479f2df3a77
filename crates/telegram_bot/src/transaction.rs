//! Draft of a transaction being composed in the chat and its Beancount rendering.

use chrono::NaiveDate;
use engine::SuggestionKind;

use crate::parsing::{Amount, AmountError, parse_amount};

/// Column at which the amount of the first posting ends.
const AMOUNT_COLUMN: usize = 52;
/// Beancount needs at least two spaces between account and amount.
const MIN_GAP: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TxField {
    Amount,
    From,
    To,
    Description,
}

impl TxField {
    /// Cache the values of this field are offered from, if any.
    pub(crate) fn suggestion_kind(self) -> Option<SuggestionKind> {
        match self {
            Self::Amount => None,
            Self::From => Some(SuggestionKind::AccountFrom),
            Self::To => Some(SuggestionKind::AccountTo),
            Self::Description => Some(SuggestionKind::Description),
        }
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum DraftError {
    #[error(transparent)]
    Amount(#[from] AmountError),
    #[error("'{0}' is not a valid account, use e.g. Assets:Wallet")]
    InvalidAccount(String),
    #[error("the description must not be empty")]
    EmptyDescription,
    #[error("the description must fit on a single line")]
    MultilineDescription,
    #[error("the transaction is already complete")]
    Complete,
    #[error("the transaction is still missing some fields")]
    Incomplete,
}

/// A transaction moving an amount from one account to another.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SimpleTx {
    date: Option<NaiveDate>,
    amount: Option<Amount>,
    from: Option<String>,
    to: Option<String>,
    description: Option<String>,
}

impl SimpleTx {
    /// Start a draft; `date` overrides the booking date (default: the day it is committed).
    pub(crate) fn new(date: Option<NaiveDate>) -> Self {
        Self {
            date,
            ..Self::default()
        }
    }

    /// The field the next user input fills.
    pub(crate) fn next_field(&self) -> Option<TxField> {
        if self.amount.is_none() {
            Some(TxField::Amount)
        } else if self.from.is_none() {
            Some(TxField::From)
        } else if self.to.is_none() {
            Some(TxField::To)
        } else if self.description.is_none() {
            Some(TxField::Description)
        } else {
            None
        }
    }

    /// Validate `input` and store it in the next missing field.
    pub(crate) fn fill(&mut self, input: &str) -> Result<TxField, DraftError> {
        let field = self.next_field().ok_or(DraftError::Complete)?;
        let input = input.trim();
        match field {
            TxField::Amount => self.amount = Some(parse_amount(input)?),
            TxField::From => self.from = Some(parse_account(input)?),
            TxField::To => self.to = Some(parse_account(input)?),
            TxField::Description => {
                if input.is_empty() {
                    return Err(DraftError::EmptyDescription);
                }
                if input.chars().any(char::is_control) {
                    return Err(DraftError::MultilineDescription);
                }
                self.description = Some(input.to_string());
            }
        }
        Ok(field)
    }

    pub(crate) fn from_account(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub(crate) fn to_account(&self) -> Option<&str> {
        self.to.as_deref()
    }

    pub(crate) fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Render the complete draft as a Beancount entry.
    ///
    /// `currency` applies unless the amount carried its own commodity, `tag`
    /// is appended to the header line, `today` is used when no date was given.
    pub(crate) fn render(
        &self,
        currency: &str,
        tag: Option<&str>,
        today: NaiveDate,
    ) -> Result<String, DraftError> {
        let (Some(amount), Some(from), Some(to), Some(description)) = (
            self.amount.as_ref(),
            self.from.as_deref(),
            self.to.as_deref(),
            self.description.as_deref(),
        ) else {
            return Err(DraftError::Incomplete);
        };

        let date = self.date.unwrap_or(today).format("%Y-%m-%d");
        let description = description.replace('\\', "\\\\").replace('"', "\\\"");
        let tag = tag.map(|t| format!(" #{t}")).unwrap_or_default();
        let currency = amount.currency.as_deref().unwrap_or(currency);

        let account = format!("  {from}");
        let value = amount.negated();
        let gap = AMOUNT_COLUMN
            .saturating_sub(account.chars().count() + value.len())
            .max(MIN_GAP);

        Ok(format!(
            "{date} * \"{description}\"{tag}\n{account}{}{value} {currency}\n  {to}\n",
            " ".repeat(gap)
        ))
    }
}

fn parse_account(input: &str) -> Result<String, DraftError> {
    let valid = !input.is_empty()
        && !input.chars().any(char::is_whitespace)
        && input.contains(':')
        && !input.starts_with(':')
        && !input.ends_with(':');
    if !valid {
        return Err(DraftError::InvalidAccount(input.to_string()));
    }
    Ok(input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn complete(inputs: [&str; 4]) -> SimpleTx {
        let mut tx = SimpleTx::new(None);
        for input in inputs {
            tx.fill(input).unwrap();
        }
        tx
    }

    #[test]
    fn fields_are_filled_in_order() {
        let mut tx = SimpleTx::new(None);
        assert_eq!(tx.next_field(), Some(TxField::Amount));
        assert_eq!(tx.fill("12.50").unwrap(), TxField::Amount);
        assert_eq!(tx.fill("Assets:Wallet").unwrap(), TxField::From);
        assert_eq!(tx.fill("Expenses:Food").unwrap(), TxField::To);
        assert_eq!(tx.fill("Groceries").unwrap(), TxField::Description);
        assert_eq!(tx.next_field(), None);
        assert_eq!(tx.fill("more"), Err(DraftError::Complete));
    }

    #[test]
    fn invalid_input_keeps_field_open() {
        let mut tx = SimpleTx::new(None);
        assert!(matches!(tx.fill("twelve"), Err(DraftError::Amount(_))));
        assert_eq!(tx.next_field(), Some(TxField::Amount));

        tx.fill("3").unwrap();
        assert_eq!(
            tx.fill("My Wallet"),
            Err(DraftError::InvalidAccount("My Wallet".to_string()))
        );
        assert_eq!(
            tx.fill("Wallet"),
            Err(DraftError::InvalidAccount("Wallet".to_string()))
        );
        assert_eq!(tx.next_field(), Some(TxField::From));
    }

    #[test]
    fn description_must_be_a_single_line() {
        let mut tx = SimpleTx::new(None);
        for input in ["5", "Assets:Cash", "Expenses:Food"] {
            tx.fill(input).unwrap();
        }
        assert_eq!(
            tx.fill("Lunch\n2024-01-01 open Assets:Other"),
            Err(DraftError::MultilineDescription)
        );
        assert_eq!(tx.fill("Lunch\tout"), Err(DraftError::MultilineDescription));
        assert_eq!(tx.next_field(), Some(TxField::Description));

        tx.fill("Lunch").unwrap();
        let rendered = tx.render("EUR", None, today()).unwrap();
        assert_eq!(rendered.lines().count(), 3);
    }

    #[test]
    fn renders_aligned_entry() {
        let tx = complete(["17.34", "Assets:Wallet", "Expenses:Groceries", "Buy something"]);
        let rendered = tx.render("EUR", None, today()).unwrap();
        let expected = format!(
            "2024-05-01 * \"Buy something\"\n  Assets:Wallet{}-17.34 EUR\n  Expenses:Groceries\n",
            " ".repeat(31)
        );
        assert_eq!(rendered, expected);
    }

    #[test]
    fn renders_tag_date_and_currency_override() {
        let mut tx = SimpleTx::new(NaiveDate::from_ymd_opt(2021, 1, 24));
        for input in ["5 usd", "Assets:Cash", "Expenses:Bar", "Coffee \"to go\""] {
            tx.fill(input).unwrap();
        }
        let rendered = tx.render("EUR", Some("vacation2021"), today()).unwrap();
        let first = rendered.lines().next().unwrap();
        assert_eq!(first, "2021-01-24 * \"Coffee \\\"to go\\\"\" #vacation2021");
        assert!(rendered.contains("-5.00 USD\n"));
    }

    #[test]
    fn long_accounts_keep_two_spaces() {
        let long = format!("Assets:{}", "Bank".repeat(12));
        let tx = complete(["1", long.as_str(), "Expenses:Fees", "Fee"]);
        let rendered = tx.render("EUR", None, today()).unwrap();
        assert!(rendered.contains(&format!("  {long}  -1.00 EUR")));
    }

    #[test]
    fn incomplete_draft_cannot_be_rendered() {
        let mut tx = SimpleTx::new(None);
        tx.fill("1").unwrap();
        assert_eq!(
            tx.render("EUR", None, today()),
            Err(DraftError::Incomplete)
        );
    }
}
