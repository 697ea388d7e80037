//! PII categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseCategoryError;

/// Category of personally identifiable information.
///
/// The built-in variants form a closed set that pattern rules and synthesis
/// rules are written against. `Custom` carries a caller-supplied label so that
/// custom patterns and detection backends can introduce new categories
/// without touching this type.
///
/// Serialized as its canonical string: the snake_case variant name, or
/// `custom:<label>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PiiCategory {
    /// Email address.
    Email,
    /// Phone number.
    Phone,
    /// National identifier (US SSN shape).
    NationalId,
    /// Payment card number.
    PaymentCard,
    /// IPv4 or IPv6 address.
    IpAddress,
    /// Calendar date.
    Date,
    /// Postal address.
    PostalAddress,
    /// Passport number.
    Passport,
    /// Driver's license number.
    DriverLicense,
    /// Bank account number or IBAN.
    BankAccount,
    /// Person's name.
    PersonName,
    /// Caller-defined category.
    Custom(String),
}

impl PiiCategory {
    /// All built-in categories, in detection priority order.
    pub const BUILTIN: [PiiCategory; 11] = [
        Self::Email,
        Self::Phone,
        Self::NationalId,
        Self::PaymentCard,
        Self::IpAddress,
        Self::Date,
        Self::PostalAddress,
        Self::Passport,
        Self::DriverLicense,
        Self::BankAccount,
        Self::PersonName,
    ];

    /// Creates a custom category with the given label.
    pub fn custom(label: impl Into<String>) -> Self {
        Self::Custom(label.into())
    }

    /// Returns the canonical name of the category kind (`"custom"` for all
    /// custom categories).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::NationalId => "national_id",
            Self::PaymentCard => "payment_card",
            Self::IpAddress => "ip_address",
            Self::Date => "date",
            Self::PostalAddress => "postal_address",
            Self::Passport => "passport",
            Self::DriverLicense => "driver_license",
            Self::BankAccount => "bank_account",
            Self::PersonName => "person_name",
            Self::Custom(_) => "custom",
        }
    }

    /// Returns the label of a custom category.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Custom(label) => Some(label),
            _ => None,
        }
    }

    /// Returns true for custom categories.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Returns a short human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Email => "Email addresses",
            Self::Phone => "Phone numbers (NANP, international, national trunk)",
            Self::NationalId => "National identifiers such as US Social Security Numbers",
            Self::PaymentCard => "Payment card numbers (Visa, Mastercard, Amex, generic)",
            Self::IpAddress => "IPv4 and IPv6 addresses",
            Self::Date => "Calendar dates (ISO, US and written forms)",
            Self::PostalAddress => "Street addresses",
            Self::Passport => "Passport numbers",
            Self::DriverLicense => "Driver's license numbers",
            Self::BankAccount => "IBANs and bank account numbers",
            Self::PersonName => "Person names (detection backend only)",
            Self::Custom(_) => "Caller-defined category",
        }
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(label) => write!(f, "custom:{label}"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl FromStr for PiiCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(label) = trimmed.strip_prefix("custom:") {
            let label = label.trim();
            if label.is_empty() {
                return Err(ParseCategoryError::MissingLabel);
            }
            return Ok(Self::Custom(label.to_string()));
        }

        let normalized = trimmed.to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "email" => Ok(Self::Email),
            "phone" | "phone_number" => Ok(Self::Phone),
            "national_id" | "ssn" => Ok(Self::NationalId),
            "payment_card" | "credit_card" | "card" => Ok(Self::PaymentCard),
            "ip_address" | "ip" => Ok(Self::IpAddress),
            "date" | "dob" | "date_of_birth" => Ok(Self::Date),
            "postal_address" | "address" => Ok(Self::PostalAddress),
            "passport" => Ok(Self::Passport),
            "driver_license" | "drivers_license" => Ok(Self::DriverLicense),
            "bank_account" | "iban" => Ok(Self::BankAccount),
            "person_name" | "name" => Ok(Self::PersonName),
            "custom" => Err(ParseCategoryError::MissingLabel),
            _ => Err(ParseCategoryError::Unknown(s.to_string())),
        }
    }
}

impl From<PiiCategory> for String {
    fn from(category: PiiCategory) -> Self {
        category.to_string()
    }
}

impl TryFrom<String> for PiiCategory {
    type Error = ParseCategoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
