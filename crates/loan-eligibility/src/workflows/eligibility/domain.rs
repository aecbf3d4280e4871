use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::coercion::{coerce_answer, numeric_value, parse_flag, parse_number};
use super::fields::ProfileField;

/// Identifier for a guided dialogue session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A typed answer captured for a single profile field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl AnswerValue {
    pub fn as_text(&self) -> String {
        match self {
            AnswerValue::Text(text) => text.clone(),
            AnswerValue::Integer(value) => value.to_string(),
            AnswerValue::Number(value) => value.to_string(),
            AnswerValue::Flag(flag) => flag.to_string(),
        }
    }

    pub fn as_number(&self) -> f64 {
        match self {
            AnswerValue::Integer(value) => *value as f64,
            AnswerValue::Number(value) if value.is_finite() => *value,
            AnswerValue::Number(_) => 0.0,
            AnswerValue::Flag(flag) => f64::from(u8::from(*flag)),
            AnswerValue::Text(text) => parse_number(text).unwrap_or(0.0),
        }
    }

    pub fn as_flag(&self) -> bool {
        match self {
            AnswerValue::Flag(flag) => *flag,
            AnswerValue::Integer(value) => *value != 0,
            AnswerValue::Number(value) => *value != 0.0,
            AnswerValue::Text(text) => parse_flag(text),
        }
    }

    /// Non-negative whole count; fractions truncate toward zero.
    pub fn as_count(&self) -> u32 {
        let value = self.as_number();
        if value > 0.0 {
            value.trunc().min(u32::MAX as f64) as u32
        } else {
            0
        }
    }

    /// Interpret a loosely-typed JSON scalar, as produced by document extraction.
    /// Nulls and nested structures carry no answer.
    pub fn from_json(field: ProfileField, value: &Value) -> Option<Self> {
        match value {
            Value::Bool(flag) => Some(AnswerValue::Flag(*flag)),
            Value::Number(number) => number
                .as_i64()
                .map(AnswerValue::Integer)
                .or_else(|| number.as_f64().map(numeric_value)),
            Value::String(raw) => Some(coerce_answer(field, raw).unwrap_or_else(|err| {
                tracing::debug!(field = field.name(), error = %err, "raw attribute defaulted");
                super::coercion::default_value(field.kind())
            })),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// Answers collected so far, keyed by field.
pub type AnswerMap = BTreeMap<ProfileField, AnswerValue>;

/// Every attribute the scoring engine reads. Absent values default to zero,
/// empty, or false. Deserializing goes through [`ApplicantProfile::from_raw_attributes`],
/// so typed JSON and loose attribute mappings follow the same coercion rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAttributes")]
pub struct ApplicantProfile {
    pub username: String,
    pub gender: String,
    pub marital_status: String,
    pub dependents: u32,
    pub education: String,
    pub age: u32,
    pub job_title: String,
    pub employment_type: String,
    pub years_of_employment: f64,
    pub annual_salary: f64,
    pub collateral_value: f64,
    pub savings_balance: f64,
    pub total_emi_amount_per_month: f64,
    pub additional_income_sources: String,
    pub previous_balance_flag: bool,
    pub previous_loan_status: String,
    pub previous_loan_amount: f64,
    pub num_credit_cards: u32,
    pub avg_credit_utilization_pct: f64,
    pub late_payment_history: bool,
    pub loan_purpose: String,
    pub loan_amount: f64,
    pub repayment_term_months: u32,
    pub wants_loan_insurance: bool,
}

/// Wire shape accepted for a profile: any JSON object.
#[derive(Deserialize)]
#[serde(transparent)]
struct RawAttributes(serde_json::Map<String, Value>);

impl From<RawAttributes> for ApplicantProfile {
    fn from(raw: RawAttributes) -> Self {
        Self::from_raw_attributes(&raw.0)
    }
}

impl ApplicantProfile {
    /// Build a profile from dialogue answers. Unanswered fields keep their defaults.
    pub fn from_answers(answers: &AnswerMap) -> Self {
        let mut profile = Self::default();
        for (field, value) in answers {
            profile.set(*field, value);
        }
        profile.normalized()
    }

    /// Build a profile from an untrusted attribute mapping (manual JSON or
    /// document extraction). Unknown keys are ignored.
    pub fn from_raw_attributes(attributes: &serde_json::Map<String, Value>) -> Self {
        let mut profile = Self::default();
        for (key, raw) in attributes {
            let Some(field) = ProfileField::from_name(key) else {
                tracing::debug!(attribute = %key, "ignoring unknown attribute");
                continue;
            };
            if let Some(value) = AnswerValue::from_json(field, raw) {
                profile.set(field, &value);
            }
        }
        profile.normalized()
    }

    /// Every field as a typed answer, in dialogue order.
    pub fn to_answers(&self) -> AnswerMap {
        ProfileField::SEQUENCE
            .iter()
            .map(|field| (*field, self.get(*field)))
            .collect()
    }

    pub fn get(&self, field: ProfileField) -> AnswerValue {
        match field {
            ProfileField::Username => AnswerValue::Text(self.username.clone()),
            ProfileField::Age => AnswerValue::Integer(i64::from(self.age)),
            ProfileField::Gender => AnswerValue::Text(self.gender.clone()),
            ProfileField::MaritalStatus => AnswerValue::Text(self.marital_status.clone()),
            ProfileField::Dependents => AnswerValue::Integer(i64::from(self.dependents)),
            ProfileField::Education => AnswerValue::Text(self.education.clone()),
            ProfileField::JobTitle => AnswerValue::Text(self.job_title.clone()),
            ProfileField::EmploymentType => AnswerValue::Text(self.employment_type.clone()),
            ProfileField::YearsOfEmployment => numeric_value(self.years_of_employment),
            ProfileField::AnnualSalary => numeric_value(self.annual_salary),
            ProfileField::CollateralValue => numeric_value(self.collateral_value),
            ProfileField::SavingsBalance => numeric_value(self.savings_balance),
            ProfileField::PreviousBalanceFlag => AnswerValue::Flag(self.previous_balance_flag),
            ProfileField::PreviousLoanStatus => {
                AnswerValue::Text(self.previous_loan_status.clone())
            }
            ProfileField::PreviousLoanAmount => numeric_value(self.previous_loan_amount),
            ProfileField::TotalEmiAmountPerMonth => numeric_value(self.total_emi_amount_per_month),
            ProfileField::LoanPurpose => AnswerValue::Text(self.loan_purpose.clone()),
            ProfileField::LoanAmount => numeric_value(self.loan_amount),
            ProfileField::RepaymentTermMonths => {
                AnswerValue::Integer(i64::from(self.repayment_term_months))
            }
            ProfileField::AdditionalIncomeSources => {
                AnswerValue::Text(self.additional_income_sources.clone())
            }
            ProfileField::NumCreditCards => AnswerValue::Integer(i64::from(self.num_credit_cards)),
            ProfileField::AvgCreditUtilizationPct => {
                numeric_value(self.avg_credit_utilization_pct)
            }
            ProfileField::LatePaymentHistory => AnswerValue::Flag(self.late_payment_history),
            ProfileField::WantsLoanInsurance => AnswerValue::Flag(self.wants_loan_insurance),
        }
    }

    pub fn set(&mut self, field: ProfileField, value: &AnswerValue) {
        match field {
            ProfileField::Username => self.username = value.as_text(),
            ProfileField::Age => self.age = value.as_count(),
            ProfileField::Gender => self.gender = value.as_text(),
            ProfileField::MaritalStatus => self.marital_status = value.as_text(),
            ProfileField::Dependents => self.dependents = value.as_count(),
            ProfileField::Education => self.education = value.as_text(),
            ProfileField::JobTitle => self.job_title = value.as_text(),
            ProfileField::EmploymentType => self.employment_type = value.as_text(),
            ProfileField::YearsOfEmployment => self.years_of_employment = value.as_number(),
            ProfileField::AnnualSalary => self.annual_salary = value.as_number(),
            ProfileField::CollateralValue => self.collateral_value = value.as_number(),
            ProfileField::SavingsBalance => self.savings_balance = value.as_number(),
            ProfileField::PreviousBalanceFlag => self.previous_balance_flag = value.as_flag(),
            ProfileField::PreviousLoanStatus => self.previous_loan_status = value.as_text(),
            ProfileField::PreviousLoanAmount => self.previous_loan_amount = value.as_number(),
            ProfileField::TotalEmiAmountPerMonth => {
                self.total_emi_amount_per_month = value.as_number()
            }
            ProfileField::LoanPurpose => self.loan_purpose = value.as_text(),
            ProfileField::LoanAmount => self.loan_amount = value.as_number(),
            ProfileField::RepaymentTermMonths => self.repayment_term_months = value.as_count(),
            ProfileField::AdditionalIncomeSources => {
                self.additional_income_sources = value.as_text()
            }
            ProfileField::NumCreditCards => self.num_credit_cards = value.as_count(),
            ProfileField::AvgCreditUtilizationPct => {
                self.avg_credit_utilization_pct = value.as_number()
            }
            ProfileField::LatePaymentHistory => self.late_payment_history = value.as_flag(),
            ProfileField::WantsLoanInsurance => self.wants_loan_insurance = value.as_flag(),
        }
    }

    /// Clamp monetary amounts and tenure to non-negative and utilisation to 0..=100.
    pub fn normalized(mut self) -> Self {
        self.years_of_employment = non_negative(self.years_of_employment);
        self.annual_salary = non_negative(self.annual_salary);
        self.collateral_value = non_negative(self.collateral_value);
        self.savings_balance = non_negative(self.savings_balance);
        self.total_emi_amount_per_month = non_negative(self.total_emi_amount_per_month);
        self.previous_loan_amount = non_negative(self.previous_loan_amount);
        self.loan_amount = non_negative(self.loan_amount);
        self.avg_credit_utilization_pct = non_negative(self.avg_credit_utilization_pct).min(100.0);
        self
    }

    pub fn display_name(&self) -> &str {
        let trimmed = self.username.trim();
        if trimmed.is_empty() {
            "Applicant"
        } else {
            trimmed
        }
    }
}

pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
