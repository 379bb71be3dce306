//! Boundary to the hosted payment widget.

use serde::Serialize;
use tokio::sync::mpsc;

/// Charge parameters in the shape the widget expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRequest {
    pub public_id: String,
    pub description: String,
    pub amount: u32,
    pub currency: String,
    pub account_id: String,
    pub invoice_id: String,
    pub skin: &'static str,
    pub data: ChargeMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeMetadata {
    pub tariff_id: String,
    pub tariff_name: String,
    pub player_nickname: String,
}

/// What the widget reports back about a charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentCallback {
    Success { invoice_id: String },
    Fail { invoice_id: String, reason: String },
    /// Sent after either outcome.
    Complete { invoice_id: String },
}

/// Handed to the widget with each charge; reports land on the checkout's
/// callback channel.
#[derive(Debug, Clone)]
pub struct PaymentSink {
    tx: mpsc::UnboundedSender<PaymentCallback>,
}

impl PaymentSink {
    pub(super) fn new(tx: mpsc::UnboundedSender<PaymentCallback>) -> Self {
        Self { tx }
    }

    fn send(&self, callback: PaymentCallback) {
        if self.tx.send(callback).is_err() {
            log::warn!("Payment callback dropped: checkout is gone");
        }
    }

    pub fn success(&self, invoice_id: &str) {
        self.send(PaymentCallback::Success {
            invoice_id: invoice_id.to_string(),
        });
    }

    pub fn fail(&self, invoice_id: &str, reason: impl Into<String>) {
        self.send(PaymentCallback::Fail {
            invoice_id: invoice_id.to_string(),
            reason: reason.into(),
        });
    }

    pub fn complete(&self, invoice_id: &str) {
        self.send(PaymentCallback::Complete {
            invoice_id: invoice_id.to_string(),
        });
    }
}

/// A payment widget. `charge` must not block; outcomes are reported through
/// the sink whenever the widget has them.
pub trait PaymentWidget: Send + Sync {
    fn charge(&self, request: ChargeRequest, sink: PaymentSink);
}

/// Stand-in widget that approves every charge immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedWidget;

impl PaymentWidget for SimulatedWidget {
    fn charge(&self, request: ChargeRequest, sink: PaymentSink) {
        log::info!(
            "Simulated charge {} for {} {} ({})",
            request.invoice_id,
            request.amount,
            request.currency,
            request.account_id
        );
        sink.success(&request.invoice_id);
        sink.complete(&request.invoice_id);
    }
}
