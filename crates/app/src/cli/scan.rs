use std::time::Duration;

use clap::Args;
use testgenium_app::{
    client::{ApiClient, PollPolicy, StartJob, poll_until_terminal},
    domain::jobs::records::{JobStatus, ScanDepth, TestProfile},
};

#[derive(Debug, Args)]
pub(crate) struct ScanArgs {
    /// Base URL of the JSON API
    #[arg(long, env = "TESTGENIUM_API_URL", default_value = "http://localhost:5000/api")]
    api_url: String,

    /// Login email
    #[arg(long, env = "TESTGENIUM_EMAIL")]
    email: String,

    /// Login password
    #[arg(long, env = "TESTGENIUM_PASSWORD", hide_env_values = true)]
    password: String,

    /// URL to assess
    #[arg(long)]
    target: String,

    /// complete, security, performance or functional
    #[arg(long, default_value = "complete")]
    profile: TestProfile,

    /// basic, standard or deep
    #[arg(long, default_value = "standard")]
    depth: ScanDepth,

    /// Give up polling after this many seconds
    #[arg(long, default_value_t = 600)]
    timeout_seconds: u64,
}

pub(crate) async fn run(args: ScanArgs) -> Result<(), String> {
    let mut client = ApiClient::new(&args.api_url).map_err(|error| error.to_string())?;

    client
        .login(&args.email, &args.password)
        .await
        .map_err(|error| format!("login failed: {error}"))?;

    let job = client
        .start_job(&StartJob {
            target: args.target,
            profile: args.profile,
            depth: args.depth,
            headers: Default::default(),
        })
        .await
        .map_err(|error| format!("failed to start job: {error}"))?;

    println!("job_id: {job}");

    let policy = PollPolicy {
        max_duration: Duration::from_secs(args.timeout_seconds),
        ..PollPolicy::default()
    };

    let report = poll_until_terminal(&client, job, policy, |report| {
        println!("{} {:>3}%", report.status, report.progress);
    })
    .await
    .map_err(|error| format!("polling failed: {error}"))?;

    if report.status == JobStatus::Failed {
        return Err(format!(
            "job failed: {}",
            report.failure.as_deref().unwrap_or("unknown reason")
        ));
    }

    if let Some(result) = &report.result {
        println!(
            "score: {} coverage: {}% vulnerabilities: {}",
            result.score, result.coverage, result.vulnerabilities
        );
    }

    for finding in report.findings.iter().flatten() {
        println!(
            "[{:?}] {} at {}: {}",
            finding.severity, finding.kind, finding.url, finding.description
        );
    }

    Ok(())
}
