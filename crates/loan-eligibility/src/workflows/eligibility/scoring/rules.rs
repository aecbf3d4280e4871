use super::super::domain::{non_negative, ApplicantProfile};
use super::{ScoreComponent, ScoringFactor};

pub(crate) const EPSILON: f64 = 1e-6;
pub(crate) const BASE_SCORE: f64 = 0.5;

const DEFAULTED_LOAN_STATUSES: [&str; 3] = ["default", "charged off", "rejected"];
const SETTLED_LOAN_STATUSES: [&str; 3] = ["paid", "closed", "settled"];

/// Clamped figures shared by the scoring rules and the reason generator.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FinancialSignals {
    pub salary: f64,
    pub monthly_income: f64,
    pub emi: f64,
    pub savings: f64,
    pub collateral: f64,
    pub utilization: f64,
    pub years_employed: f64,
    pub loan_amount: f64,
}

impl FinancialSignals {
    pub(crate) fn from_profile(profile: &ApplicantProfile) -> Self {
        let salary = non_negative(profile.annual_salary);
        Self {
            salary,
            monthly_income: salary / 12.0,
            emi: non_negative(profile.total_emi_amount_per_month),
            savings: non_negative(profile.savings_balance),
            collateral: non_negative(profile.collateral_value),
            utilization: non_negative(profile.avg_credit_utilization_pct).min(100.0),
            years_employed: non_negative(profile.years_of_employment),
            loan_amount: non_negative(profile.loan_amount),
        }
    }

    /// Monthly EMI over monthly income; `None` without a declared income.
    pub(crate) fn emi_ratio(&self) -> Option<f64> {
        (self.monthly_income > 0.0).then(|| self.emi / (self.monthly_income + EPSILON))
    }

    /// Requested amount over annual salary; `None` without a declared salary.
    pub(crate) fn loan_to_salary(&self) -> Option<f64> {
        (self.salary > 0.0).then(|| self.loan_amount / (self.salary + EPSILON))
    }
}

pub(crate) fn score_profile(profile: &ApplicantProfile) -> Vec<ScoreComponent> {
    let signals = FinancialSignals::from_profile(profile);
    let mut components = Vec::new();
    let mut push = |factor, delta, notes: String| {
        components.push(ScoreComponent {
            factor,
            delta,
            notes,
        })
    };

    if signals.monthly_income > 0.0 {
        let income = signals.monthly_income;
        let delta = if income > 50_000.0 {
            0.20
        } else if income > 30_000.0 {
            0.12
        } else if income > 15_000.0 {
            0.06
        } else {
            -0.05
        };
        push(
            ScoringFactor::IncomeTier,
            delta,
            format!("monthly income {income:.0}"),
        );
    }

    if let Some(ratio) = signals.emi_ratio() {
        let delta = if ratio < 0.2 {
            0.10
        } else if ratio < 0.4 {
            0.02
        } else if ratio < 0.6 {
            -0.04
        } else {
            -0.12
        };
        push(
            ScoringFactor::EmiBurden,
            delta,
            format!("EMI is {:.0}% of monthly income", ratio * 100.0),
        );
    }

    if signals.savings > 50_000.0 {
        push(
            ScoringFactor::Savings,
            0.06,
            format!("savings balance {:.0}", signals.savings),
        );
    }

    if signals.collateral > 0.0 {
        let coverage = signals.collateral / (signals.loan_amount + EPSILON);
        push(
            ScoringFactor::Collateral,
            (coverage * 0.05).min(0.08),
            format!("collateral covers {coverage:.2}x the requested amount"),
        );
    }

    // Zero utilisation and zero tenure read as "not reported".
    if signals.utilization > 0.0 {
        let utilization = signals.utilization;
        let delta = if utilization < 30.0 {
            0.06
        } else if utilization < 60.0 {
            0.0
        } else {
            -0.07
        };
        push(
            ScoringFactor::CreditUtilization,
            delta,
            format!("average credit utilisation {utilization:.0}%"),
        );
    }

    if signals.years_employed >= 3.0 {
        push(
            ScoringFactor::EmploymentTenure,
            0.05,
            format!("{} years employed", signals.years_employed),
        );
    } else if signals.years_employed > 0.0 && signals.years_employed < 1.0 {
        push(
            ScoringFactor::EmploymentTenure,
            -0.03,
            format!("{} years employed", signals.years_employed),
        );
    }

    let status = profile.previous_loan_status.trim().to_lowercase();
    if DEFAULTED_LOAN_STATUSES.contains(&status.as_str()) {
        push(
            ScoringFactor::PreviousLoanStatus,
            -0.18,
            format!("previous loan {status}"),
        );
    } else if SETTLED_LOAN_STATUSES.contains(&status.as_str()) {
        push(
            ScoringFactor::PreviousLoanStatus,
            0.04,
            format!("previous loan {status}"),
        );
    }

    if profile.previous_balance_flag {
        push(
            ScoringFactor::OutstandingBalance,
            -0.05,
            "outstanding previous loan balance".to_string(),
        );
    }

    if profile.late_payment_history {
        push(
            ScoringFactor::LatePayments,
            -0.10,
            "late payments on record".to_string(),
        );
    }

    if profile.num_credit_cards >= 4 {
        push(
            ScoringFactor::CreditCardCount,
            -0.03,
            format!("{} active credit cards", profile.num_credit_cards),
        );
    }

    if let Some(ratio) = signals.loan_to_salary() {
        if ratio > 2.5 {
            push(
                ScoringFactor::LoanToSalary,
                -0.08,
                format!("loan is {ratio:.2}x annual salary"),
            );
        } else if ratio < 0.5 {
            push(
                ScoringFactor::LoanToSalary,
                0.03,
                format!("loan is {ratio:.2}x annual salary"),
            );
        }
    }

    if profile.wants_loan_insurance {
        push(
            ScoringFactor::LoanInsurance,
            0.02,
            "opted into loan insurance".to_string(),
        );
    }

    components
}

/// Base score plus every contribution, in rule order, clamped to `[0, 1]`.
pub(crate) fn combine(components: &[ScoreComponent]) -> f64 {
    let raw = components
        .iter()
        .fold(BASE_SCORE, |score, component| score + component.delta);
    raw.clamp(0.0, 1.0)
}
