use mediaoss_core::Outcome;
use serde::Serialize;

/// Pretty JSON for an outcome, the same `{status, msg, data}` shape callers
/// of the library see.
pub fn render_outcome<T: Serialize>(outcome: &Outcome<T>) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(outcome)?)
}

/// Process exit code for an outcome.
pub fn exit_code<T>(outcome: &Outcome<T>) -> i32 {
    if outcome.is_success() {
        0
    } else {
        1
    }
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays JSON.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
