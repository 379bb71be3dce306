//! Tariff checkout.
//!
//! Validates the purchase, builds the widget charge request and turns widget
//! callbacks into notifications. No money moves anywhere in this crate.

mod widget;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;

pub use widget::{
    ChargeMetadata, ChargeRequest, PaymentCallback, PaymentSink, PaymentWidget, SimulatedWidget,
};

use crate::catalog::{find_tariff, TariffPlan};
use crate::config::PaymentConfig;
use crate::error::{AppError, Result};
use crate::notification::Notification;
use crate::validation::require_text;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The tariff costs nothing; the widget was not contacted.
    AlreadyActive(Notification),
    /// Charge handed to the widget; wait for callbacks.
    Submitted { invoice_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Home,
}

/// Client-side navigation requested after a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub to: Route,
    pub after: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackResponse {
    pub notification: Option<Notification>,
    pub redirect: Option<Redirect>,
}

struct PendingPayment {
    invoice_id: String,
    tariff: &'static TariffPlan,
    nickname: String,
}

pub struct Checkout {
    widget: Option<Arc<dyn PaymentWidget>>,
    settings: PaymentConfig,
    sink: PaymentSink,
    processing: bool,
    pending: Option<PendingPayment>,
}

impl Checkout {
    /// Build a checkout. Widget callbacks arrive on the returned receiver and
    /// must be fed back through [`Checkout::handle_callback`].
    pub fn new(
        widget: Option<Arc<dyn PaymentWidget>>,
        settings: PaymentConfig,
    ) -> (Self, mpsc::UnboundedReceiver<PaymentCallback>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let checkout = Self {
            widget,
            settings,
            sink: PaymentSink::new(tx),
            processing: false,
            pending: None,
        };
        (checkout, rx)
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    fn build_request(
        &self,
        tariff: &TariffPlan,
        nickname: &str,
        invoice_id: &str,
    ) -> ChargeRequest {
        ChargeRequest {
            public_id: self.settings.public_id.clone(),
            description: format!("Tariff \"{}\" - MC Host", tariff.name),
            amount: tariff.price,
            currency: self.settings.currency.clone(),
            account_id: nickname.to_string(),
            invoice_id: invoice_id.to_string(),
            skin: "mini",
            data: ChargeMetadata {
                tariff_id: tariff.id.to_string(),
                tariff_name: tariff.name.to_string(),
                player_nickname: nickname.to_string(),
            },
        }
    }

    /// Start paying for a tariff on behalf of a player nickname.
    pub fn checkout(&mut self, tariff_id: &str, nickname: &str) -> Result<CheckoutOutcome> {
        let nickname = require_text("nickname", nickname)?;
        let tariff = find_tariff(tariff_id)?;

        if tariff.is_free() {
            return Ok(CheckoutOutcome::AlreadyActive(Notification::info(
                "The free plan is already active",
            )));
        }
        if self.processing {
            return Err(AppError::payment_in_progress());
        }
        let Some(widget) = self.widget.as_ref().map(Arc::clone) else {
            log::warn!("Checkout for {} attempted without a payment widget", tariff.id);
            return Err(AppError::payment_widget_unavailable());
        };

        let invoice_id = format!("inv-{}", uuid::Uuid::new_v4().simple());
        let request = self.build_request(tariff, nickname, &invoice_id);

        self.processing = true;
        self.pending = Some(PendingPayment {
            invoice_id: invoice_id.clone(),
            tariff,
            nickname: nickname.to_string(),
        });
        log::info!(
            "Submitting invoice {} for tariff {} ({} {})",
            invoice_id,
            tariff.id,
            tariff.price,
            self.settings.currency
        );
        widget.charge(request, self.sink.clone());

        Ok(CheckoutOutcome::Submitted { invoice_id })
    }

    /// Apply one widget callback. Callbacks for unknown invoices are ignored.
    pub fn handle_callback(&mut self, callback: PaymentCallback) -> CallbackResponse {
        let invoice_id = match &callback {
            PaymentCallback::Success { invoice_id }
            | PaymentCallback::Fail { invoice_id, .. }
            | PaymentCallback::Complete { invoice_id } => invoice_id.as_str(),
        };
        let Some(pending) = self
            .pending
            .as_ref()
            .filter(|p| p.invoice_id == invoice_id)
        else {
            log::warn!("Ignoring callback for unknown invoice {}", invoice_id);
            return CallbackResponse::default();
        };

        let response = match &callback {
            PaymentCallback::Success { .. } => {
                log::info!("Invoice {} paid", pending.invoice_id);
                CallbackResponse {
                    notification: Some(Notification::success(format!(
                        "Payment successful! Tariff \"{}\" activated for {}",
                        pending.tariff.name, pending.nickname
                    ))),
                    redirect: Some(Redirect {
                        to: Route::Home,
                        after: self.settings.redirect_delay(),
                    }),
                }
            }
            PaymentCallback::Fail { reason, .. } => {
                log::warn!("Invoice {} failed: {}", pending.invoice_id, reason);
                CallbackResponse {
                    notification: Some(Notification::error(format!(
                        "Payment failed: {}",
                        reason
                    ))),
                    redirect: None,
                }
            }
            PaymentCallback::Complete { .. } => CallbackResponse::default(),
        };

        self.processing = false;
        if matches!(callback, PaymentCallback::Complete { .. }) {
            self.pending = None;
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::ErrorKind;
    use crate::notification::NotificationLevel;

    /// Records requests and never answers.
    #[derive(Default)]
    struct RecordingWidget {
        requests: Mutex<Vec<ChargeRequest>>,
    }

    impl PaymentWidget for RecordingWidget {
        fn charge(&self, request: ChargeRequest, _sink: PaymentSink) {
            self.requests
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(request);
        }
    }

    struct DecliningWidget;

    impl PaymentWidget for DecliningWidget {
        fn charge(&self, request: ChargeRequest, sink: PaymentSink) {
            sink.fail(&request.invoice_id, "card declined");
            sink.complete(&request.invoice_id);
        }
    }

    fn invoice_of(outcome: CheckoutOutcome) -> Option<String> {
        match outcome {
            CheckoutOutcome::Submitted { invoice_id } => Some(invoice_id),
            CheckoutOutcome::AlreadyActive(_) => None,
        }
    }

    fn recording() -> (Arc<RecordingWidget>, Checkout) {
        let widget = Arc::new(RecordingWidget::default());
        let dyn_widget: Arc<dyn PaymentWidget> = Arc::clone(&widget) as Arc<dyn PaymentWidget>;
        let (checkout, _rx) = Checkout::new(Some(dyn_widget), PaymentConfig::default());
        (widget, checkout)
    }

    #[test]
    fn blank_nickname_is_rejected() {
        let (widget, mut checkout) = recording();
        let err = checkout.checkout("pro", "  ").expect_err("blank");
        assert_eq!(err.kind(), ErrorKind::FieldRequired);
        assert!(widget.requests.lock().expect("lock").is_empty());
    }

    #[test]
    fn free_tariff_never_reaches_widget() {
        let (widget, mut checkout) = recording();
        let outcome = checkout.checkout("free", "Steve").expect("free");
        assert!(matches!(outcome, CheckoutOutcome::AlreadyActive(_)));
        assert!(!checkout.is_processing());
        assert!(widget.requests.lock().expect("lock").is_empty());
    }

    #[test]
    fn missing_widget_is_an_error() {
        let (mut checkout, _rx) = Checkout::new(None, PaymentConfig::default());
        let err = checkout.checkout("pro", "Steve").expect_err("no widget");
        assert_eq!(err.kind(), ErrorKind::PaymentWidgetUnavailable);
        assert!(!checkout.is_processing());
    }

    #[test]
    fn charge_request_carries_tariff_and_nickname() {
        let (widget, mut checkout) = recording();
        let invoice_id = invoice_of(checkout.checkout("premium", " Alex ").expect("submit"))
            .expect("submitted");

        let requests = widget.requests.lock().expect("lock");
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.invoice_id, invoice_id);
        assert_eq!(request.amount, 599);
        assert_eq!(request.currency, "RUB");
        assert_eq!(request.account_id, "Alex");
        assert_eq!(request.description, "Tariff \"Premium\" - MC Host");

        let json = serde_json::to_value(request).expect("serialize");
        assert_eq!(json["data"]["tariffId"], serde_json::json!("premium"));
        assert_eq!(json["publicId"], serde_json::json!("pk_mchost_demo"));
    }

    #[test]
    fn second_checkout_while_processing_is_rejected() {
        let (_widget, mut checkout) = recording();
        checkout.checkout("pro", "Steve").expect("first");
        let err = checkout.checkout("pro", "Steve").expect_err("second");
        assert_eq!(err.kind(), ErrorKind::PaymentInProgress);
    }

    #[test]
    fn success_notifies_and_redirects_home() {
        let (_widget, mut checkout) = recording();
        let invoice_id =
            invoice_of(checkout.checkout("pro", "Steve").expect("submit")).expect("submitted");

        let response = checkout.handle_callback(PaymentCallback::Success {
            invoice_id: invoice_id.clone(),
        });
        let note = response.notification.expect("notification");
        assert_eq!(note.level, NotificationLevel::Success);
        assert!(note.message.contains("Steve"));
        assert_eq!(
            response.redirect,
            Some(Redirect {
                to: Route::Home,
                after: Duration::from_secs(2)
            })
        );
        assert!(!checkout.is_processing());

        let response = checkout.handle_callback(PaymentCallback::Complete { invoice_id });
        assert_eq!(response, CallbackResponse::default());
    }

    #[tokio::test]
    async fn declined_payment_reports_reason() {
        let widget: Arc<dyn PaymentWidget> = Arc::new(DecliningWidget);
        let (mut checkout, mut rx) = Checkout::new(Some(widget), PaymentConfig::default());
        checkout.checkout("unlimited", "Steve").expect("submit");
        assert!(checkout.is_processing());

        let fail = rx.recv().await.expect("fail callback");
        let response = checkout.handle_callback(fail);
        let note = response.notification.expect("notification");
        assert_eq!(note.level, NotificationLevel::Error);
        assert_eq!(note.message, "Payment failed: card declined");
        assert!(response.redirect.is_none());
        assert!(!checkout.is_processing());

        let complete = rx.recv().await.expect("complete callback");
        checkout.handle_callback(complete);
        checkout.checkout("pro", "Steve").expect("can retry");
    }

    #[test]
    fn unknown_invoice_is_ignored() {
        let (_widget, mut checkout) = recording();
        checkout.checkout("pro", "Steve").expect("submit");
        let response = checkout.handle_callback(PaymentCallback::Success {
            invoice_id: "inv-bogus".to_string(),
        });
        assert_eq!(response, CallbackResponse::default());
        assert!(checkout.is_processing());
    }
}
