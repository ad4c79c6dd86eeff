//! Mailbox address: an email address with an optional display name

use std::{fmt, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;

use super::{EmailAddress, EmailAddressError};

lazy_static! {
    static ref NAMED_ADDRESS_REGEX: Regex = Regex::new(r"^\s*(.*?)\s*<([^<>]*)>\s*$").unwrap();
}

/// An email address, possibly with a display name (`Name <local@domain>`)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    name: Option<String>,
    email: EmailAddress,
}

impl Address {
    /// Creates an address from its parts. A blank name is treated as absent.
    pub fn new(name: Option<&str>, email: EmailAddress) -> Self {
        let name = name
            .map(|n| n.trim().trim_matches('"').trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Self { name, email }
    }

    /// Parses either `local@domain` or `Display Name <local@domain>`.
    pub fn parse(raw: &str) -> Result<Self, EmailAddressError> {
        match NAMED_ADDRESS_REGEX.captures(raw) {
            Some(captures) => {
                let email = EmailAddress::new(&captures[2])?;
                Ok(Self::new(Some(&captures[1]), email))
            }
            None => Ok(Self::new(None, EmailAddress::new(raw)?)),
        }
    }

    /// The display name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The bare email address
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}

impl From<EmailAddress> for Address {
    fn from(email: EmailAddress) -> Self {
        Self { name: None, email }
    }
}

impl FromStr for Address {
    type Err = EmailAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.email),
            None => write!(f, "{}", self.email),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_parse_bare_address() -> TestResult {
        let address = Address::parse("tito@example.com")?;

        assert_eq!(address.name(), None);
        assert_eq!(address.email().as_str(), "tito@example.com");

        Ok(())
    }

    #[test]
    fn test_parse_named_address() -> TestResult {
        let address: Address = "\"Tito Fornasiero\" <tito@example.com>".parse()?;

        assert_eq!(address.name(), Some("Tito Fornasiero"));
        assert_eq!(address.email().as_str(), "tito@example.com");
        assert_eq!(address.to_string(), "Tito Fornasiero <tito@example.com>");

        Ok(())
    }

    #[test]
    fn test_parse_angle_brackets_without_name() -> TestResult {
        let address = Address::parse("<tito@example.com>")?;

        assert_eq!(address.name(), None);
        assert_eq!(address.to_string(), "tito@example.com");

        Ok(())
    }

    #[test]
    fn test_parse_invalid_named_address() {
        let result = Address::parse("Tito <not-an-address>");

        assert!(matches!(
            result,
            Err(EmailAddressError::InvalidEmailAddress(_))
        ));
    }

    #[test]
    fn test_parse_empty_address() {
        assert_eq!(Address::parse(""), Err(EmailAddressError::EmptyEmailAddress));
    }
}
