use crate::infra::{
    default_status_policy, standard_catalog, standard_roster, InMemoryApplicationRepository,
    InMemoryDocumentStore, InMemoryRoleSessions,
};
use chrono::{Duration, Local, NaiveDate};
use clap::{Args, ValueEnum};
use intern_track::error::AppError;
use intern_track::workflows::internship::applications::{
    ApplicationServiceError, ApplicationSubmission, DocumentUpload,
    InternshipApplicationService, StudentProfile, Workplace,
};
use intern_track::workflows::internship::calendar::{
    compute_end_date, count_working_days, WeeklyPattern,
};
use intern_track::workflows::internship::domain::{
    CommissionMemberId, InternshipTypeId, RequirementId, RuleKind, SubmissionStage,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum PatternArg {
    /// Monday through Friday
    Five,
    /// Monday through Saturday
    Six,
}

impl From<PatternArg> for WeeklyPattern {
    fn from(value: PatternArg) -> Self {
        match value {
            PatternArg::Five => WeeklyPattern::FiveDays,
            PatternArg::Six => WeeklyPattern::SixDays,
        }
    }
}

impl std::fmt::Display for PatternArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PatternArg::Five => "five",
            PatternArg::Six => "six",
        })
    }
}

#[derive(Args, Debug)]
pub(crate) struct EndDateArgs {
    /// Internship start date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start_date: NaiveDate,
    /// Required working-day count
    #[arg(long)]
    pub(crate) working_days: u32,
    /// Weekly working pattern
    #[arg(long, value_enum, default_value_t = PatternArg::Five)]
    pub(crate) pattern: PatternArg,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Internship start date (YYYY-MM-DD). Defaults to thirty days from today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start_date: Option<NaiveDate>,
    /// Override the submission date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Run the internship on a Monday-Saturday week
    #[arg(long)]
    pub(crate) six_day_week: bool,
}

pub(crate) fn run_end_date(args: EndDateArgs) -> Result<(), AppError> {
    let pattern = WeeklyPattern::from(args.pattern);
    let end_date = compute_end_date(args.start_date, args.working_days, pattern)
        .map_err(|err| AppError::from(ApplicationServiceError::from(err)))?;

    println!("Working-day calendar");
    println!("- Pattern: {}", pattern.label());
    println!("- Start {} -> end {}", args.start_date, end_date);
    println!(
        "- {} working days over {} calendar days",
        args.working_days,
        (end_date - args.start_date).num_days() + 1
    );

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let start_date = args.start_date.unwrap_or(today + Duration::days(30));
    let weekly_pattern = if args.six_day_week {
        WeeklyPattern::SixDays
    } else {
        WeeklyPattern::FiveDays
    };

    println!("Internship application demo");
    println!("Submitted {today} | internship starts {start_date} ({})", weekly_pattern.label());

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let documents = Arc::new(InMemoryDocumentStore::default());
    let service = InternshipApplicationService::new(
        Arc::new(Mutex::new(standard_catalog())),
        repository,
        documents,
        default_status_policy(),
    );

    let record = match service.submit(demo_submission(start_date, weekly_pattern), today) {
        Ok(record) => record,
        Err(err) => {
            println!("  Submission rejected: {err}");
            return Ok(());
        }
    };
    let id = record.application.id.clone();
    let end_date = record.application.end_date;

    println!(
        "- Received application {} -> status {}",
        id.0,
        record.application.status.label()
    );
    println!(
        "  Schedule: {} -> {} ({} working days)",
        record.application.start_date,
        end_date,
        count_working_days(record.application.start_date, end_date, weekly_pattern)
    );
    println!("  Requirements:");
    for requirement in &record.application.requirements {
        println!(
            "    - {} [{} / {}] -> {}",
            requirement.name,
            requirement.kind.label(),
            requirement.stage.label(),
            requirement.status.label()
        );
    }

    println!("\nStudent uploads");
    let application_documents: Vec<(RequirementId, String)> = record
        .application
        .requirements
        .iter()
        .filter(|r| r.kind == RuleKind::Document && r.stage == SubmissionStage::Application)
        .map(|r| (r.id.clone(), r.name.clone()))
        .collect();
    for (requirement_id, name) in &application_documents {
        match service.upload_document(&id, requirement_id, demo_upload(name), today) {
            Ok(view) => println!("- Uploaded '{}' -> application {}", name, view.status_label),
            Err(err) => {
                println!("  Upload failed: {err}");
                return Ok(());
            }
        }
    }

    println!("\nCommission");
    let mut roster = standard_roster();
    let sessions = InMemoryRoleSessions::default();
    match roster.promote_chairman(
        "Computer Engineering",
        &CommissionMemberId("cm-aksoy".to_string()),
        &sessions,
    ) {
        Ok(change) => {
            let demotion = change
                .demoted
                .map(|demoted| format!(" (demoted {})", demoted.0))
                .unwrap_or_default();
            println!("- Promoted {} to chairman{demotion}", change.promoted.0);
        }
        Err(err) => println!("- Chairman promotion failed: {err}"),
    }
    for dropped in sessions.invalidated() {
        println!("  Role sessions invalidated for {}", dropped.0);
    }

    if let Some(chairman) = roster.chairman_of("Computer Engineering") {
        match service.record_assignment(&id, chairman.id.clone(), today) {
            Ok(view) => println!(
                "- Assigned to {} -> application {}",
                chairman.full_name, view.status_label
            ),
            Err(err) => println!("- Assignment failed: {err}"),
        }
    }

    println!("\nCommission review");
    for (requirement_id, name) in &application_documents {
        match service.approve_requirement(&id, requirement_id, today) {
            Ok(view) => println!("- Approved '{}' -> application {}", name, view.status_label),
            Err(err) => println!("- Approval of '{}' failed: {err}", name),
        }
    }

    match service.refresh_status(&id, start_date) {
        Ok(view) => println!("\nOn {start_date} the internship is {}", view.status_label),
        Err(err) => println!("\nStatus sweep failed: {err}"),
    }

    // Wrap-up: the journal lands after the internship ends.
    let wrap_up = end_date + Duration::days(3);
    let submission_requirements: Vec<(RequirementId, String, RuleKind)> = record
        .application
        .requirements
        .iter()
        .filter(|r| r.stage == SubmissionStage::Submission)
        .map(|r| (r.id.clone(), r.name.clone(), r.kind))
        .collect();
    for (requirement_id, name, kind) in &submission_requirements {
        if *kind == RuleKind::Document {
            if let Err(err) =
                service.upload_document(&id, requirement_id, demo_upload(name), wrap_up)
            {
                println!("  Upload of '{}' failed: {err}", name);
            }
        }
        match service.approve_requirement(&id, requirement_id, wrap_up) {
            Ok(view) => println!("- Approved '{}' -> application {}", name, view.status_label),
            Err(err) => println!("- Approval of '{}' failed: {err}", name),
        }
    }

    match service.progress(&id, wrap_up) {
        Ok(report) => {
            println!("\nFinal progress ({})", report.status_label);
            for entry in &report.stage_progress {
                println!(
                    "- {} stage: {}/{} approved",
                    entry.stage_label, entry.approved, entry.total
                );
            }
            println!(
                "- Overall: {}/{} requirements approved",
                report.approved_requirements, report.total_requirements
            );
        }
        Err(err) => println!("\nProgress report unavailable: {err}"),
    }

    match service.get(&id, wrap_up) {
        Ok(view) => match serde_json::to_string_pretty(&view) {
            Ok(json) => println!("\nPublic status payload:\n{json}"),
            Err(err) => println!("\nPublic status payload unavailable: {err}"),
        },
        Err(err) => println!("\nApplication lookup failed: {err}"),
    }

    Ok(())
}

fn demo_submission(start_date: NaiveDate, weekly_pattern: WeeklyPattern) -> ApplicationSubmission {
    ApplicationSubmission {
        student: StudentProfile {
            student_number: "2021556021".to_string(),
            full_name: "Ayse Yilmaz".to_string(),
            email: "ayse.yilmaz@example.edu".to_string(),
            department: "Computer Engineering".to_string(),
        },
        internship_type: InternshipTypeId("summer-practice-1".to_string()),
        workplace: Workplace {
            company_name: "Delta Software".to_string(),
            address: "Teknopark 42, Istanbul".to_string(),
            supervisor_name: "Murat Kaya".to_string(),
            supervisor_email: Some("murat.kaya@delta.example".to_string()),
        },
        start_date,
        weekly_pattern,
    }
}

fn demo_upload(requirement_name: &str) -> DocumentUpload {
    let slug: String = requirement_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    DocumentUpload {
        file_name: format!("{slug}.pdf"),
        document_type: "scan".to_string(),
        description: format!("Scanned {requirement_name}"),
        content: b"scanned document".to_vec(),
    }
}
