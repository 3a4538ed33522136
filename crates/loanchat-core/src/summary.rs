//! # Loan Summary
//!
//! The figures shown on the loan summary card, derived from the mirrored
//! application. Requested terms are shown while the application is being
//! negotiated; approved terms fill in when nothing was requested.

use crate::format::{format_currency, format_rate};
use crate::types::{Application, Customer, LoanDecision};
use serde::Serialize;

/// Card contents. Zero means "not known yet".
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct LoanSummary {
    pub customer_name: Option<String>,
    pub loan_amount: f64,
    pub tenure_months: u32,
    pub interest_rate: f64,
    pub emi: f64,
    pub decision: LoanDecision,
    pub loan_approved: bool,
}

impl LoanSummary {
    #[must_use]
    pub fn from_application(
        application: Option<&Application>,
        customer: Option<&Customer>,
    ) -> Self {
        let customer_name = customer
            .map(|c| c.name.clone())
            .filter(|name| !name.is_empty());

        let Some(app) = application else {
            return Self {
                customer_name,
                ..Self::default()
            };
        };

        Self {
            customer_name,
            loan_amount: first_nonzero(&[app.requested_amount, app.approved_amount]),
            tenure_months: app
                .requested_tenure
                .filter(|t| *t != 0)
                .or(app.approved_tenure.filter(|t| *t != 0))
                .unwrap_or(0),
            interest_rate: first_nonzero(&[app.interest_rate]),
            emi: first_nonzero(&[app.emi, app.emi_amount]),
            decision: app.decision,
            loan_approved: app.loan_approved,
        }
    }

    #[must_use]
    pub fn amount_label(&self) -> String {
        format_currency(Some(self.loan_amount))
    }

    #[must_use]
    pub fn tenure_label(&self) -> String {
        format!("{} months", self.tenure_months)
    }

    #[must_use]
    pub fn rate_label(&self) -> String {
        format_rate(Some(self.interest_rate))
    }

    #[must_use]
    pub fn emi_label(&self) -> String {
        format_currency(Some(self.emi))
    }
}

fn first_nonzero(candidates: &[Option<f64>]) -> f64 {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|v| *v != 0.0 && v.is_finite())
        .unwrap_or(0.0)
}
