use crate::infra::build_service;
use chrono::Utc;
use clap::Args;
use loan_eligibility::config::AppConfig;
use loan_eligibility::error::AppError;
use loan_eligibility::telemetry::{self, TelemetryError};
use loan_eligibility::workflows::eligibility::{
    ApplicantProfile, CoercionPolicy, DialogueReply, ProfileCsvImporter, SessionId, Verdict,
};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("source").required(true).args(["profile", "csv"]))]
pub(crate) struct AssessArgs {
    /// JSON file holding a single applicant profile
    #[arg(long)]
    pub(crate) profile: Option<PathBuf>,
    /// CSV export with one applicant per row
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Also write a Markdown report for each applicant
    #[arg(long)]
    pub(crate) report: bool,
    /// Override the configured report directory
    #[arg(long)]
    pub(crate) report_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct InterviewArgs {
    /// Re-ask questions whose answers are not valid numbers
    #[arg(long)]
    pub(crate) strict: bool,
    /// Override the configured report directory
    #[arg(long)]
    pub(crate) report_dir: Option<PathBuf>,
}

fn load_config(report_dir: Option<PathBuf>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = report_dir {
        config.reports.dir = dir;
    }
    match telemetry::init(&config.telemetry) {
        Ok(()) | Err(TelemetryError::AlreadyInstalled(_)) => Ok(config),
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        profile,
        csv,
        report,
        report_dir,
    } = args;

    let config = load_config(report_dir)?;
    let service = build_service(&config);

    let applicants: Vec<(String, ApplicantProfile)> = match (profile, csv) {
        (Some(path), _) => {
            let raw = tokio::fs::read_to_string(&path).await?;
            let profile: ApplicantProfile = serde_json::from_str(&raw)?;
            vec![(path.display().to_string(), profile.normalized())]
        }
        (None, Some(path)) => ProfileCsvImporter::from_path(&path)?
            .into_iter()
            .map(|imported| (format!("row {}", imported.row), imported.profile))
            .collect(),
        (None, None) => {
            return Err(AppError::Input(
                "either --profile or --csv is required".to_string(),
            ))
        }
    };

    println!("Loan eligibility assessment ({} applicant(s))", applicants.len());
    for (label, profile) in &applicants {
        let verdict = service.assess(profile);
        render_verdict(label, profile, &verdict);
        if report {
            let artifact = service.assemble_report(profile, &verdict)?;
            println!("  Report: {}", artifact.path.display());
        }
    }

    Ok(())
}

fn render_verdict(label: &str, profile: &ApplicantProfile, verdict: &Verdict) {
    println!(
        "- {} [{}] -> {}",
        profile.display_name(),
        label,
        verdict.summary()
    );
    for reason in &verdict.reasons {
        println!("    * {reason}");
    }
    for component in &verdict.components {
        println!(
            "    {:?}: {:+.2} ({})",
            component.factor, component.delta, component.notes
        );
    }
}

pub(crate) async fn run_interview(args: InterviewArgs) -> Result<(), AppError> {
    let InterviewArgs { strict, report_dir } = args;

    let mut config = load_config(report_dir)?;
    if strict {
        config.sessions.coercion = CoercionPolicy::Reprompt;
    }
    let service = build_service(&config);
    let session_id = SessionId::generate();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut answer: Option<String> = None;

    loop {
        match service.step(&session_id, answer.as_deref(), Utc::now())? {
            DialogueReply::InProgress {
                question, notice, ..
            } => {
                if let Some(notice) = notice {
                    println!("  ({notice})");
                }
                println!("{question}");
                match lines.next_line().await? {
                    Some(line) => answer = Some(line),
                    None => {
                        println!("Interview cancelled before completion.");
                        return Ok(());
                    }
                }
            }
            DialogueReply::Completed(completed) => {
                let verdict = &completed.verdict;
                println!("\n{}", verdict.summary());
                for reason in &verdict.reasons {
                    println!("  * {reason}");
                }
                let artifact = service.assemble_report(&completed.profile, verdict)?;
                println!("Report written to {}", artifact.path.display());
                return Ok(());
            }
        }
    }
}
