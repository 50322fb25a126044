//! Customer accounts.
//!
//! There is no identity backend: login accepts any well-formed credentials and
//! returns the demo profile, registration is a form check followed by an
//! email-code confirmation step. Everything here is synchronous validation;
//! callers add the artificial latency of the "network" call themselves.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Email, EmailError, UserId};

/// Minimum accepted password length at registration and password change.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Address granted access to the admin panel unless configured otherwise.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";

/// Errors raised by account operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// Email is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// A required field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Password shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("password must be at least {} characters", MIN_PASSWORD_LENGTH)]
    WeakPassword,

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Terms of service were not accepted.
    #[error("terms of service must be accepted")]
    TermsNotAccepted,

    /// Verification code missing.
    #[error("verification code is required")]
    MissingVerificationCode,
}

/// A signed-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl UserProfile {
    /// "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether this user may open the admin panel.
    #[must_use]
    pub fn is_admin(&self, admin_email: &str) -> bool {
        self.email.matches(admin_email)
    }

    /// Apply an edit of the personal-information form.
    ///
    /// # Errors
    ///
    /// Returns `AccountError` if a name is blank or the email is invalid; the
    /// profile is left untouched in that case.
    pub fn apply_update(&mut self, update: ProfileUpdate) -> Result<(), AccountError> {
        let first_name = required(update.first_name, "first_name")?;
        let last_name = required(update.last_name, "last_name")?;
        let email = Email::parse(&update.email)?;

        self.first_name = first_name;
        self.last_name = last_name;
        self.email = email;
        self.phone = optional(update.phone);
        self.address = optional(update.address);
        Ok(())
    }
}

fn required(value: String, field: &'static str) -> Result<String, AccountError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AccountError::MissingField(field))
    } else {
        Ok(trimmed.to_owned())
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Sign in.
///
/// Any non-blank password is accepted; the returned profile is the demo
/// customer carrying the submitted address.
///
/// # Errors
///
/// Returns `AccountError` if the email is invalid or the password is blank.
pub fn login(email: &str, password: &str) -> Result<UserProfile, AccountError> {
    let email = Email::parse(email)?;
    if password.is_empty() {
        return Err(AccountError::MissingField("password"));
    }

    Ok(UserProfile {
        id: UserId::new(1),
        first_name: "John".to_owned(),
        last_name: "Doe".to_owned(),
        email,
        phone: Some("+33123456789".to_owned()),
        address: Some("123 Rue de Paris, Paris, France".to_owned()),
    })
}

/// Validate the address for a password-reset request.
///
/// # Errors
///
/// Returns `AccountError::InvalidEmail` if the address is malformed.
pub fn request_password_reset(email: &str) -> Result<Email, AccountError> {
    Ok(Email::parse(email)?)
}

/// Registration form as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub accept_terms: bool,
}

impl RegistrationForm {
    /// Check the form and move on to the email-code step.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule: blank name, invalid email, short
    /// password, mismatched confirmation, terms not accepted.
    pub fn validate(self) -> Result<PendingRegistration, AccountError> {
        let first_name = required(self.first_name, "first_name")?;
        let last_name = required(self.last_name, "last_name")?;
        let email = Email::parse(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AccountError::WeakPassword);
        }
        if self.password != self.confirm_password {
            return Err(AccountError::PasswordMismatch);
        }
        if !self.accept_terms {
            return Err(AccountError::TermsNotAccepted);
        }

        Ok(PendingRegistration {
            first_name,
            last_name,
            email,
            phone: optional(self.phone),
            address: optional(self.address),
        })
    }
}

/// A validated registration awaiting its emailed verification code.
///
/// The password is not retained past validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl PendingRegistration {
    /// Confirm the registration with the emailed code.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::MissingVerificationCode` for a blank code.
    pub fn verify(self, code: &str) -> Result<UserProfile, AccountError> {
        if code.trim().is_empty() {
            return Err(AccountError::MissingVerificationCode);
        }
        Ok(UserProfile {
            id: UserId::new(1),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
        })
    }
}

/// Personal-information form.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Password-change form.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChange {
    /// Check the form.
    ///
    /// # Errors
    ///
    /// Returns `AccountError` for a blank current password, a short new
    /// password or a mismatched confirmation.
    pub fn validate(&self) -> Result<(), AccountError> {
        if self.current_password.is_empty() {
            return Err(AccountError::MissingField("current_password"));
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AccountError::WeakPassword);
        }
        if self.new_password != self.confirm_password {
            return Err(AccountError::PasswordMismatch);
        }
        Ok(())
    }
}

/// Delivery state of a past order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    InProgress,
    Delivered,
}

/// Row of the account page's order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderHistoryEntry {
    pub id: String,
    pub date: NaiveDate,
    pub status: OrderStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub items: u32,
}

/// The demo customer's order history.
#[must_use]
pub fn order_history() -> Vec<OrderHistoryEntry> {
    let entry = |id: &str, (y, m, d): (i32, u32, u32), status, cents, items| OrderHistoryEntry {
        id: id.to_owned(),
        date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        status,
        total: Decimal::new(cents, 2),
        items,
    };

    vec![
        entry("12345", (2023, 5, 15), OrderStatus::Delivered, 12999, 2),
        entry("12346", (2023, 4, 28), OrderStatus::InProgress, 8999, 1),
        entry("12347", (2023, 3, 10), OrderStatus::Delivered, 23450, 3),
    ]
}
