use serde::{Deserialize, Serialize};

/// Applicant attributes in the order the guided dialogue asks for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Username,
    Age,
    Gender,
    MaritalStatus,
    Dependents,
    Education,
    JobTitle,
    EmploymentType,
    YearsOfEmployment,
    AnnualSalary,
    CollateralValue,
    SavingsBalance,
    PreviousBalanceFlag,
    PreviousLoanStatus,
    PreviousLoanAmount,
    TotalEmiAmountPerMonth,
    LoanPurpose,
    LoanAmount,
    RepaymentTermMonths,
    AdditionalIncomeSources,
    NumCreditCards,
    AvgCreditUtilizationPct,
    LatePaymentHistory,
    WantsLoanInsurance,
}

/// How a raw answer is interpreted before it is stored against a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Numeric,
    Flag,
}

impl ProfileField {
    /// Fixed question order. Seeded sessions rely on this ordering staying stable.
    pub const SEQUENCE: [ProfileField; 24] = [
        ProfileField::Username,
        ProfileField::Age,
        ProfileField::Gender,
        ProfileField::MaritalStatus,
        ProfileField::Dependents,
        ProfileField::Education,
        ProfileField::JobTitle,
        ProfileField::EmploymentType,
        ProfileField::YearsOfEmployment,
        ProfileField::AnnualSalary,
        ProfileField::CollateralValue,
        ProfileField::SavingsBalance,
        ProfileField::PreviousBalanceFlag,
        ProfileField::PreviousLoanStatus,
        ProfileField::PreviousLoanAmount,
        ProfileField::TotalEmiAmountPerMonth,
        ProfileField::LoanPurpose,
        ProfileField::LoanAmount,
        ProfileField::RepaymentTermMonths,
        ProfileField::AdditionalIncomeSources,
        ProfileField::NumCreditCards,
        ProfileField::AvgCreditUtilizationPct,
        ProfileField::LatePaymentHistory,
        ProfileField::WantsLoanInsurance,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ProfileField::Username => "username",
            ProfileField::Age => "age",
            ProfileField::Gender => "gender",
            ProfileField::MaritalStatus => "marital_status",
            ProfileField::Dependents => "dependents",
            ProfileField::Education => "education",
            ProfileField::JobTitle => "job_title",
            ProfileField::EmploymentType => "employment_type",
            ProfileField::YearsOfEmployment => "years_of_employment",
            ProfileField::AnnualSalary => "annual_salary",
            ProfileField::CollateralValue => "collateral_value",
            ProfileField::SavingsBalance => "savings_balance",
            ProfileField::PreviousBalanceFlag => "previous_balance_flag",
            ProfileField::PreviousLoanStatus => "previous_loan_status",
            ProfileField::PreviousLoanAmount => "previous_loan_amount",
            ProfileField::TotalEmiAmountPerMonth => "total_emi_amount_per_month",
            ProfileField::LoanPurpose => "loan_purpose",
            ProfileField::LoanAmount => "loan_amount",
            ProfileField::RepaymentTermMonths => "repayment_term_months",
            ProfileField::AdditionalIncomeSources => "additional_income_sources",
            ProfileField::NumCreditCards => "num_credit_cards",
            ProfileField::AvgCreditUtilizationPct => "avg_credit_utilization_pct",
            ProfileField::LatePaymentHistory => "late_payment_history",
            ProfileField::WantsLoanInsurance => "wants_loan_insurance",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Self::SEQUENCE
            .iter()
            .copied()
            .find(|field| field.name().eq_ignore_ascii_case(wanted))
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            ProfileField::PreviousBalanceFlag
            | ProfileField::LatePaymentHistory
            | ProfileField::WantsLoanInsurance => FieldKind::Flag,
            ProfileField::Age
            | ProfileField::Dependents
            | ProfileField::YearsOfEmployment
            | ProfileField::AnnualSalary
            | ProfileField::CollateralValue
            | ProfileField::SavingsBalance
            | ProfileField::PreviousLoanAmount
            | ProfileField::TotalEmiAmountPerMonth
            | ProfileField::LoanAmount
            | ProfileField::RepaymentTermMonths
            | ProfileField::NumCreditCards
            | ProfileField::AvgCreditUtilizationPct => FieldKind::Numeric,
            _ => FieldKind::Text,
        }
    }

    pub const fn question(self) -> &'static str {
        match self {
            ProfileField::Username => "What's your name?",
            ProfileField::Age => "What is your age?",
            ProfileField::Gender => "What is your gender?",
            ProfileField::MaritalStatus => "Are you married, single, or other?",
            ProfileField::Dependents => "How many dependents do you have?",
            ProfileField::Education => "What is your highest education?",
            ProfileField::JobTitle => "What is your current occupation?",
            ProfileField::EmploymentType => "Employment type (salaried/self-employed)?",
            ProfileField::YearsOfEmployment => "How many years have you been employed?",
            ProfileField::AnnualSalary => "What is your annual salary?",
            ProfileField::CollateralValue => "Value of collateral if any?",
            ProfileField::SavingsBalance => "Current savings balance?",
            ProfileField::PreviousBalanceFlag => {
                "Do you have any outstanding previous loan balance? (yes/no)"
            }
            ProfileField::PreviousLoanStatus => "Status of previous loan (paid/default/other)?",
            ProfileField::PreviousLoanAmount => "Previous loan amount if any?",
            ProfileField::TotalEmiAmountPerMonth => "Total EMI amount per month?",
            ProfileField::LoanPurpose => "Purpose of the loan?",
            ProfileField::LoanAmount => "How much loan do you want?",
            ProfileField::RepaymentTermMonths => "Repayment term in months?",
            ProfileField::AdditionalIncomeSources => "Any additional sources of income?",
            ProfileField::NumCreditCards => "How many credit cards do you have?",
            ProfileField::AvgCreditUtilizationPct => "Average credit utilization percentage?",
            ProfileField::LatePaymentHistory => "Have you had any late payments? (yes/no)",
            ProfileField::WantsLoanInsurance => "Do you want loan insurance? (yes/no)",
        }
    }
}
