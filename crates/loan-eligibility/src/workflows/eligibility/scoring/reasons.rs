use serde::{Deserialize, Serialize};
use std::fmt;

use super::super::domain::ApplicantProfile;
use super::rules::FinancialSignals;
use super::ELIGIBILITY_THRESHOLD;

/// Explanations attached to an ineligible verdict, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibilityReason {
    LowMonthlyIncome,
    HighLoanToSalary,
    HighEmiBurden,
    HighCreditUtilization,
    LatePaymentHistory,
    OutstandingBalance,
    TooManyCreditCards,
    GeneralInstability,
}

impl IneligibilityReason {
    pub const fn message(self) -> &'static str {
        match self {
            IneligibilityReason::LowMonthlyIncome => {
                "Monthly income is low relative to typical loan requirements."
            }
            IneligibilityReason::HighLoanToSalary => {
                "Requested loan amount is high relative to annual salary."
            }
            IneligibilityReason::HighEmiBurden => "Existing EMIs exceed 50% of monthly income.",
            IneligibilityReason::HighCreditUtilization => {
                "High credit utilization; reduce usage on credit cards."
            }
            IneligibilityReason::LatePaymentHistory => "History of late payments detected.",
            IneligibilityReason::OutstandingBalance => {
                "Outstanding previous loan balance flagged."
            }
            IneligibilityReason::TooManyCreditCards => "Too many active credit cards.",
            IneligibilityReason::GeneralInstability => {
                "Availability of credit and stability of income need improvement."
            }
        }
    }
}

impl fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

pub fn reason_codes(profile: &ApplicantProfile, probability: f64) -> Vec<IneligibilityReason> {
    let signals = FinancialSignals::from_profile(profile);
    let mut reasons = Vec::new();

    if signals.monthly_income < 15_000.0 {
        reasons.push(IneligibilityReason::LowMonthlyIncome);
    }
    if signals.salary > 0.0 && signals.loan_amount / signals.salary > 2.5 {
        reasons.push(IneligibilityReason::HighLoanToSalary);
    }
    if signals.emi_ratio().is_some_and(|ratio| ratio > 0.5) {
        reasons.push(IneligibilityReason::HighEmiBurden);
    }
    if signals.utilization > 60.0 {
        reasons.push(IneligibilityReason::HighCreditUtilization);
    }
    if profile.late_payment_history {
        reasons.push(IneligibilityReason::LatePaymentHistory);
    }
    if profile.previous_balance_flag {
        reasons.push(IneligibilityReason::OutstandingBalance);
    }
    if profile.num_credit_cards >= 6 {
        reasons.push(IneligibilityReason::TooManyCreditCards);
    }
    if reasons.is_empty() && probability < ELIGIBILITY_THRESHOLD {
        reasons.push(IneligibilityReason::GeneralInstability);
    }

    reasons
}

/// Human-readable reasons; safe to call for any probability.
pub fn reasons(profile: &ApplicantProfile, probability: f64) -> Vec<String> {
    reason_codes(profile, probability)
        .into_iter()
        .map(|reason| reason.message().to_string())
        .collect()
}
