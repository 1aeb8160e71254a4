use anyhow::{Context, Result};
use pipeline_resource::cli::output::{format_failure, format_log_location};
use pipeline_resource::cli::Cli;
use pipeline_resource::core::OutRequest;
use pipeline_resource::execution::{run_out, ApplyOrchestrator, OutResponse};
use pipeline_resource::fly::{FlyClient, FlyClientConfig};
use pipeline_resource::logging::{self, Sanitizer, SanitizingSink};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, error, info_span, Instrument};
use uuid::Uuid;

/// Set at build time through `RESOURCE_VERSION`, else the crate version
const VERSION: &str = match option_env!("RESOURCE_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::from_args();

    // Filled in once the request's secrets are known
    let mut mask = Sanitizer::default();

    if let Err(e) = run(cli, &mut mask).await {
        eprintln!("{}", format_failure(&mask.sanitize(&format!("{:#}", e))));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mask: &mut Sanitizer) -> Result<()> {
    let (mut log_file, log_path) = logging::create_log_file(&std::env::temp_dir())?;
    writeln!(log_file, "Concourse Pipeline Resource version: {}", VERSION)?;
    eprintln!("{}", format_log_location(&log_path));

    let sink = SanitizingSink::new(log_file, Sanitizer::default());

    let request: OutRequest = match serde_json::from_reader(std::io::stdin().lock()) {
        Ok(request) => request,
        Err(e) => {
            writeln!(sink.clone(), "Exiting with error: {}", e)?;
            return Err(e).context("Failed to decode request from stdin");
        }
    };

    *mask = Sanitizer::new(request.source.secrets()).context("Failed to build secret masker")?;
    logging::init(sink.with_sanitizer(mask.clone()))?;

    let result = apply(cli, &request).await;
    if let Err(e) = &result {
        error!("Exiting with error: {:#}", e);
    }
    result
}

/// Everything after the run log is installed
async fn apply(cli: Cli, request: &OutRequest) -> Result<()> {
    let fly_path = match cli.fly {
        Some(path) => path,
        None => fly_alongside_executable()?,
    };
    let config = FlyClientConfig::new()
        .with_fly_path(fly_path)
        .with_timeout(cli.timeout_secs);
    let mut orchestrator = ApplyOrchestrator::new(FlyClient::new(config), VERSION);

    let span = info_span!("out", run_id = %Uuid::new_v4());
    let response = run_out(
        request,
        &cli.sources_dir,
        cli.external_url.as_deref(),
        &mut orchestrator,
    )
    .instrument(span)
    .await?;

    debug!("Returning output: {:?}", response);
    write_response(&response).context("Failed to write response")
}

fn write_response(response: &OutResponse) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()
}

fn fly_alongside_executable() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    let dir = exe
        .parent()
        .context("Running executable has no parent directory")?;
    Ok(FlyClientConfig::alongside(dir).fly_path)
}
