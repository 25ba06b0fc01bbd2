use demo_service::{init_tracing, load_options, run_script};
use service_trace::Runtime;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let runtime = Runtime::global();
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from)
        && let Err(e) = load_options(&runtime, &path)
    {
        error!(error = %e, path = %path.display(), "Invalid options");
        return ExitCode::FAILURE;
    }

    for line in run_script(&runtime).await {
        println!("{}", line);
    }
    ExitCode::SUCCESS
}
