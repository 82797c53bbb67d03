//! Payment validation. Nothing here moves money: a method is checked for shape and, if it
//! passes, yields the [`PaymentConfirmation`] checkout requires.

use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PaymentError {
    #[error("Invalid card number")]
    InvalidCardNumber,
    #[error("Invalid expiry date")]
    InvalidExpiry,
    #[error("Invalid CVV")]
    InvalidCvv,
    #[error("Invalid UPI ID")]
    InvalidUpiId,
    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),
}

#[derive(Clone, PartialEq)]
pub enum PaymentMethod {
    Card {
        number: String,
        /// `MM/YY`
        expiry: String,
        cvv: String,
    },
    Upi {
        id: String,
    },
    CashOnDelivery,
}

/// Card details stay out of logs.
impl std::fmt::Debug for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Card { .. } => f.write_str("Card([REDACTED])"),
            PaymentMethod::Upi { id } => f.debug_struct("Upi").field("id", id).finish(),
            PaymentMethod::CashOnDelivery => f.write_str("CashOnDelivery"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentKind {
    Card,
    Upi,
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn kind(&self) -> PaymentKind {
        match self {
            PaymentMethod::Card { .. } => PaymentKind::Card,
            PaymentMethod::Upi { .. } => PaymentKind::Upi,
            PaymentMethod::CashOnDelivery => PaymentKind::CashOnDelivery,
        }
    }
}

/// Proof that a payment method was accepted for `amount`. Only [`confirm_payment`] makes one.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentConfirmation {
    kind: PaymentKind,
    amount: f64,
}

impl PaymentConfirmation {
    pub fn kind(&self) -> PaymentKind {
        self.kind
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }
}

pub fn confirm_payment(
    method: &PaymentMethod,
    amount: f64,
) -> Result<PaymentConfirmation, PaymentError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(PaymentError::InvalidAmount(amount));
    }
    match method {
        PaymentMethod::Card {
            number,
            expiry,
            cvv,
        } => {
            let digits: String = number.chars().filter(|c| !c.is_whitespace()).collect();
            if !all_digits(&digits, 16) {
                return Err(PaymentError::InvalidCardNumber);
            }
            if !is_expiry(expiry) {
                return Err(PaymentError::InvalidExpiry);
            }
            if !all_digits(cvv, 3) {
                return Err(PaymentError::InvalidCvv);
            }
        }
        PaymentMethod::Upi { id } => {
            if !is_upi_id(id) {
                return Err(PaymentError::InvalidUpiId);
            }
        }
        PaymentMethod::CashOnDelivery => {}
    }
    info!(method = ?method.kind(), amount, "Payment accepted");
    Ok(PaymentConfirmation {
        kind: method.kind(),
        amount,
    })
}

fn all_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_expiry(s: &str) -> bool {
    match s.split_once('/') {
        Some((mm, yy)) => all_digits(mm, 2) && all_digits(yy, 2),
        None => false,
    }
}

fn is_upi_id(s: &str) -> bool {
    let handle_char = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-');
    match s.split_once('@') {
        Some((user, provider)) => {
            !user.is_empty()
                && !provider.is_empty()
                && user.chars().all(handle_char)
                && provider.chars().all(handle_char)
        }
        None => false,
    }
}

/// Group the digits of a card number in fours for display.
///
/// Non-digits are discarded and at most sixteen digits are kept. Input with fewer than four
/// digits is returned unchanged.
pub fn format_card_number(input: &str) -> String {
    let digits: Vec<char> = input
        .chars()
        .filter(char::is_ascii_digit)
        .take(16)
        .collect();
    if digits.len() < 4 {
        return input.to_string();
    }
    digits
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}
