use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::domain::ApplicantProfile;
use super::scoring::rules::EPSILON;
use super::scoring::Verdict;

/// Everything a report assembler receives. The profile is normalized and the
/// probability is already within `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct ReportRequest<'a> {
    pub profile: &'a ApplicantProfile,
    pub verdict: &'a Verdict,
    pub output_id: &'a str,
}

/// Location of an assembled report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportArtifact {
    pub file_name: String,
    pub path: PathBuf,
}

impl ReportArtifact {
    pub fn url(&self) -> String {
        format!("/reports/{}", self.file_name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("unable to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid report identifier '{0}'")]
    InvalidIdentifier(String),
    #[error("report assembly interrupted: {0}")]
    Interrupted(String),
}

/// Document rendering boundary (PDF, Markdown, remote renderer, ...).
pub trait ReportAssembler: Send + Sync {
    fn assemble(&self, request: &ReportRequest<'_>) -> Result<ReportArtifact, AssemblyError>;
}

/// Normalised strength of the main factors, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorContributions {
    pub income: f64,
    pub emi_burden: f64,
    pub savings: f64,
    pub collateral: f64,
    pub credit_utilization: f64,
}

impl FactorContributions {
    pub fn from_profile(profile: &ApplicantProfile) -> Self {
        let monthly_income = profile.annual_salary.max(0.0) / 12.0;
        let emi_share =
            (profile.total_emi_amount_per_month.max(0.0) / (monthly_income + EPSILON)).min(1.0);
        let coverage =
            profile.collateral_value.max(0.0) / (profile.loan_amount.max(0.0) + EPSILON);

        Self {
            income: (monthly_income / 50_000.0).min(1.0),
            emi_burden: (1.0 - emi_share).max(0.0),
            savings: (profile.savings_balance.max(0.0) / 200_000.0).min(1.0),
            collateral: coverage.min(1.0),
            credit_utilization: (1.0
                - (profile.avg_credit_utilization_pct.max(0.0) / 100.0).min(1.0))
            .max(0.0),
        }
    }

    pub fn labelled(&self) -> [(&'static str, f64); 5] {
        [
            ("Income", self.income),
            ("EMI Burden", self.emi_burden),
            ("Savings", self.savings),
            ("Collateral", self.collateral),
            ("Credit Util", self.credit_utilization),
        ]
    }
}

/// Writes `<output_id>.md` reports into a directory.
#[derive(Debug, Clone)]
pub struct MarkdownReportAssembler {
    dir: PathBuf,
}

impl MarkdownReportAssembler {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn render(request: &ReportRequest<'_>) -> String {
        let ReportRequest {
            profile, verdict, ..
        } = *request;
        let mut out = String::new();

        let _ = writeln!(
            out,
            "# Loan Eligibility Report: {}\n",
            profile.display_name()
        );
        let _ = writeln!(
            out,
            "Eligibility Probability: {:.1}%  ",
            verdict.probability * 100.0
        );
        let _ = writeln!(
            out,
            "Result: {}\n",
            if verdict.eligible {
                "Eligible"
            } else {
                "Not Eligible"
            }
        );

        out.push_str("## Key Applicant Details\n\n");
        let _ = writeln!(out, "- Age: {}", profile.age);
        let _ = writeln!(
            out,
            "- Employment: {} ({} yrs)",
            profile.employment_type, profile.years_of_employment
        );
        let _ = writeln!(out, "- Annual Salary: {}", profile.annual_salary);
        let _ = writeln!(out, "- Loan Amount: {}", profile.loan_amount);
        let _ = writeln!(
            out,
            "- Monthly EMI: {}\n",
            profile.total_emi_amount_per_month
        );

        out.push_str("## Reasons / Suggestions\n\n");
        if verdict.reasons.is_empty() {
            out.push_str("No negative reasons detected. Application looks good.\n");
        } else {
            for reason in &verdict.reasons {
                let _ = writeln!(out, "- {reason}");
            }
        }

        let _ = writeln!(
            out,
            "\n## Factor Contributions (eligibility {}%)\n",
            (verdict.probability * 100.0) as u32
        );
        out.push_str("```\n");
        for (label, value) in FactorContributions::from_profile(profile).labelled() {
            let filled = (value * 20.0).round() as usize;
            let _ = writeln!(
                out,
                "{label:<12} {}{} {value:.2}",
                "#".repeat(filled),
                ".".repeat(20 - filled.min(20))
            );
        }
        out.push_str("```\n");

        if !verdict.components.is_empty() {
            out.push_str("\n## Score Breakdown\n\n");
            for component in &verdict.components {
                let _ = writeln!(
                    out,
                    "- {:?}: {:+.2} ({})",
                    component.factor, component.delta, component.notes
                );
            }
        }

        out
    }
}

impl ReportAssembler for MarkdownReportAssembler {
    fn assemble(&self, request: &ReportRequest<'_>) -> Result<ReportArtifact, AssemblyError> {
        let id = request.output_id;
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
        if !valid {
            return Err(AssemblyError::InvalidIdentifier(id.to_string()));
        }

        fs::create_dir_all(&self.dir).map_err(|source| AssemblyError::Write {
            path: self.dir.clone(),
            source,
        })?;

        let file_name = format!("{id}.md");
        let path = self.dir.join(&file_name);
        fs::write(&path, Self::render(request)).map_err(|source| AssemblyError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), "report written");
        Ok(ReportArtifact { file_name, path })
    }
}
