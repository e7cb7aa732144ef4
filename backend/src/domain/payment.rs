//! Mock payment gateway used by the checkout flow.
//!
//! No money moves: after validating the entered details the simulator waits
//! for a configured delay and then always succeeds with a generated
//! transaction id.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::Error;

/// Delay used by the checkout page before reporting success.
pub const DEFAULT_PAYMENT_DELAY: Duration = Duration::from_millis(3000);

/// How the user chose to pay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Direct card entry.
    #[default]
    Card,
    /// UPI virtual payment address.
    Upi,
    /// Card entered through the Razorpay widget.
    Razorpay,
    /// PayPal checkout.
    Paypal,
}

impl PaymentMethod {
    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Upi => "upi",
            Self::Razorpay => "razorpay",
            Self::Paypal => "paypal",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardDetails {
    /// Card number; spaces are ignored.
    pub card_number: String,
    /// Name on the card.
    pub card_holder: String,
    /// Expiry month.
    pub expiry_month: String,
    /// Expiry year.
    pub expiry_year: String,
    /// Security code.
    pub cvv: String,
}

impl CardDetails {
    /// Check the fields the checkout form requires.
    pub fn validate(&self) -> Result<(), PaymentValidationError> {
        let digits: String = self
            .card_number
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect();
        if digits.len() != 16 || !digits.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(PaymentValidationError::InvalidCardNumber);
        }
        if self.card_holder.trim().is_empty() {
            return Err(PaymentValidationError::MissingCardHolder);
        }
        if self.expiry_month.trim().is_empty() || self.expiry_year.trim().is_empty() {
            return Err(PaymentValidationError::MissingExpiry);
        }
        let cvv = self.cvv.trim();
        if cvv.len() != 3 || !cvv.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(PaymentValidationError::InvalidCvv);
        }
        Ok(())
    }
}

/// Payment details for each method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentDetails {
    /// Direct card entry.
    Card(CardDetails),
    /// UPI payment.
    Upi {
        /// Virtual payment address.
        #[serde(rename = "upiId")]
        upi_id: String,
    },
    /// Razorpay card entry.
    Razorpay(CardDetails),
    /// PayPal; the provider collects details itself.
    Paypal,
}

impl PaymentDetails {
    /// The method these details belong to.
    pub const fn method(&self) -> PaymentMethod {
        match self {
            Self::Card(_) => PaymentMethod::Card,
            Self::Upi { .. } => PaymentMethod::Upi,
            Self::Razorpay(_) => PaymentMethod::Razorpay,
            Self::Paypal => PaymentMethod::Paypal,
        }
    }

    /// Validate the fields required by the method.
    pub fn validate(&self) -> Result<(), PaymentValidationError> {
        match self {
            Self::Card(card) | Self::Razorpay(card) => card.validate(),
            Self::Upi { upi_id } if upi_id.trim().is_empty() => {
                Err(PaymentValidationError::MissingUpiId)
            }
            Self::Upi { .. } | Self::Paypal => Ok(()),
        }
    }
}

/// Reasons the entered payment details are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentValidationError {
    /// Card number is not 16 digits.
    InvalidCardNumber,
    /// Card holder is blank.
    MissingCardHolder,
    /// Expiry month or year is blank.
    MissingExpiry,
    /// CVV is not 3 digits.
    InvalidCvv,
    /// UPI id is blank.
    MissingUpiId,
}

impl fmt::Display for PaymentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCardNumber => write!(f, "please enter a valid 16-digit card number"),
            Self::MissingCardHolder => write!(f, "please enter card holder name"),
            Self::MissingExpiry => write!(f, "please enter card expiry date"),
            Self::InvalidCvv => write!(f, "please enter a valid 3-digit CVV"),
            Self::MissingUpiId => write!(f, "please enter a UPI id"),
        }
    }
}

impl std::error::Error for PaymentValidationError {}

impl From<PaymentValidationError> for Error {
    fn from(value: PaymentValidationError) -> Self {
        Self::payment_declined(value.to_string())
    }
}

/// Outcome of a successful simulated payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Gateway transaction id.
    pub transaction_id: String,
    /// Method used.
    pub method: PaymentMethod,
    /// When the payment completed.
    pub paid_at: DateTime<Utc>,
}

/// Suspends the simulator between validation and success.
#[async_trait]
pub trait PaymentSleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the Tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl PaymentSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Client-side payment simulator.
#[derive(Clone)]
pub struct PaymentSimulator {
    delay: Duration,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn PaymentSleeper>,
}

impl PaymentSimulator {
    /// Simulator that waits `delay` on the Tokio timer.
    pub fn new(delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self::with_sleeper(delay, clock, Arc::new(TokioSleeper))
    }

    /// Simulator with an explicit sleeper.
    pub fn with_sleeper(
        delay: Duration,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn PaymentSleeper>,
    ) -> Self {
        Self {
            delay,
            clock,
            sleeper,
        }
    }

    /// Validate `details`, wait, and report success.
    pub async fn pay(&self, details: &PaymentDetails) -> Result<PaymentReceipt, Error> {
        details.validate()?;
        self.sleeper.sleep(self.delay).await;

        let paid_at = self.clock.utc();
        let millis = paid_at.timestamp_millis();
        let method = details.method();
        let transaction_id = match method {
            PaymentMethod::Razorpay => format!("pay_razorpay_card_{millis}"),
            PaymentMethod::Card | PaymentMethod::Upi | PaymentMethod::Paypal => {
                format!("TXN{millis}")
            }
        };
        info!(%method, transaction_id = %transaction_id, "simulated payment succeeded");
        Ok(PaymentReceipt {
            transaction_id,
            method,
            paid_at,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;
    use crate::domain::ErrorCode;
    use chrono::{Local, TimeZone};
    use rstest::{fixture, rstest};
    use std::sync::Mutex;

    struct FixtureClock;

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            Utc.timestamp_millis_opt(1_767_225_600_123)
                .single()
                .expect("valid fixture timestamp")
        }
    }

    #[derive(Default)]
    struct RecordingSleeper(Mutex<Vec<Duration>>);

    #[async_trait]
    impl PaymentSleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.0.lock().expect("sleeper mutex").push(duration);
        }
    }

    #[fixture]
    fn card() -> CardDetails {
        CardDetails {
            card_number: "4111 1111 1111 1111".to_owned(),
            card_holder: "Ana Rao".to_owned(),
            expiry_month: "12".to_owned(),
            expiry_year: "2030".to_owned(),
            cvv: "123".to_owned(),
        }
    }

    #[rstest]
    #[case::short_number(|c: &mut CardDetails| c.card_number = "4111".to_owned(), PaymentValidationError::InvalidCardNumber)]
    #[case::letters(|c: &mut CardDetails| c.card_number = "4111 1111 1111 111x".to_owned(), PaymentValidationError::InvalidCardNumber)]
    #[case::holder(|c: &mut CardDetails| c.card_holder = " ".to_owned(), PaymentValidationError::MissingCardHolder)]
    #[case::expiry(|c: &mut CardDetails| c.expiry_year.clear(), PaymentValidationError::MissingExpiry)]
    #[case::cvv(|c: &mut CardDetails| c.cvv = "12".to_owned(), PaymentValidationError::InvalidCvv)]
    fn card_validation_rejects_bad_fields(
        mut card: CardDetails,
        #[case] mutate: fn(&mut CardDetails),
        #[case] expected: PaymentValidationError,
    ) {
        mutate(&mut card);
        assert_eq!(card.validate(), Err(expected));
    }

    #[rstest]
    #[tokio::test]
    async fn successful_payment_waits_then_issues_a_transaction_id(card: CardDetails) {
        let sleeper = Arc::new(RecordingSleeper::default());
        let simulator = PaymentSimulator::with_sleeper(
            DEFAULT_PAYMENT_DELAY,
            Arc::new(FixtureClock),
            sleeper.clone(),
        );

        let receipt = simulator
            .pay(&PaymentDetails::Card(card))
            .await
            .expect("valid card pays");

        assert_eq!(receipt.transaction_id, "TXN1767225600123");
        assert_eq!(receipt.method, PaymentMethod::Card);
        assert_eq!(
            *sleeper.0.lock().expect("sleeper mutex"),
            vec![DEFAULT_PAYMENT_DELAY]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn razorpay_ids_use_their_own_prefix(card: CardDetails) {
        let simulator = PaymentSimulator::with_sleeper(
            Duration::ZERO,
            Arc::new(FixtureClock),
            Arc::new(RecordingSleeper::default()),
        );
        let receipt = simulator
            .pay(&PaymentDetails::Razorpay(card))
            .await
            .expect("valid card pays");
        assert_eq!(receipt.transaction_id, "pay_razorpay_card_1767225600123");
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_details_never_sleep() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let simulator =
            PaymentSimulator::with_sleeper(DEFAULT_PAYMENT_DELAY, Arc::new(FixtureClock), sleeper.clone());

        let error = simulator
            .pay(&PaymentDetails::Upi {
                upi_id: "  ".to_owned(),
            })
            .await
            .expect_err("blank UPI id");

        assert_eq!(error.code(), ErrorCode::PaymentDeclined);
        assert!(sleeper.0.lock().expect("sleeper mutex").is_empty());
    }
}
