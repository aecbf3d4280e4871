mod reasons;
pub(crate) mod rules;

pub use reasons::{reason_codes, reasons, IneligibilityReason};

use super::domain::ApplicantProfile;
use serde::{Deserialize, Serialize};

/// Probability at or above which an applicant is eligible.
pub const ELIGIBILITY_THRESHOLD: f64 = 0.5;

/// Heuristic eligibility probability in `[0, 1]`. Never fails.
pub fn score(profile: &ApplicantProfile) -> f64 {
    rules::combine(&rules::score_profile(profile))
}

/// Stateless evaluator producing verdicts with an auditable factor trail.
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityEngine;

impl EligibilityEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(&self, profile: &ApplicantProfile) -> Verdict {
        let components = rules::score_profile(profile);
        let probability = rules::combine(&components);
        let eligible = probability >= ELIGIBILITY_THRESHOLD;
        let reasons = if eligible {
            Vec::new()
        } else {
            reasons(profile, probability)
        };

        tracing::debug!(probability, eligible, factors = components.len(), "profile assessed");

        Verdict {
            probability,
            eligible,
            reasons,
            components,
        }
    }
}

/// Heuristic factors that can move the score away from the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringFactor {
    IncomeTier,
    EmiBurden,
    Savings,
    Collateral,
    CreditUtilization,
    EmploymentTenure,
    PreviousLoanStatus,
    OutstandingBalance,
    LatePayments,
    CreditCardCount,
    LoanToSalary,
    LoanInsurance,
}

/// Discrete contribution to a verdict, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoringFactor,
    pub delta: f64,
    pub notes: String,
}

/// Probability, eligibility and the reasons behind a negative outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub probability: f64,
    pub eligible: bool,
    pub reasons: Vec<String>,
    pub components: Vec<ScoreComponent>,
}

impl Verdict {
    pub const fn eligibility_label(&self) -> &'static str {
        if self.eligible {
            "eligible"
        } else {
            "not eligible"
        }
    }

    /// Probability rounded to four decimals for API payloads.
    pub fn rounded_probability(&self) -> f64 {
        (self.probability * 10_000.0).round() / 10_000.0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ({:.1}% probability)",
            if self.eligible {
                "Eligible"
            } else {
                "Not Eligible"
            },
            self.probability * 100.0
        )
    }
}
