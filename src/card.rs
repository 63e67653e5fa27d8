use std::{fmt, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardError {
    #[error("expected number@expiry@cvc, got {0} field(s)")]
    FieldCount(usize),
    #[error("card {0} is empty")]
    EmptyField(&'static str),
}

/// Payment card used when a booking has to be paid for online.
#[derive(Clone, PartialEq, Eq)]
pub struct Card {
    pub number: String,
    pub expiry: String,
    pub cvc: String,
}

impl Card {
    /// First four digits, the only part that is ever logged.
    pub fn masked_number(&self) -> String {
        let prefix: String = self.number.chars().take(4).collect();
        format!("{prefix}****")
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Card")
            .field("number", &self.masked_number())
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl FromStr for Card {
    type Err = CardError;

    /// Parses `number@expiry@cvc`, e.g. `4242424242424242@12/30@123`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('@').map(str::trim).collect();
        let [number, expiry, cvc] = parts[..] else {
            return Err(CardError::FieldCount(parts.len()));
        };
        for (name, value) in [("number", number), ("expiry", expiry), ("cvc", cvc)] {
            if value.is_empty() {
                return Err(CardError::EmptyField(name));
            }
        }
        Ok(Self {
            number: number.to_string(),
            expiry: expiry.to_string(),
            cvc: cvc.to_string(),
        })
    }
}
