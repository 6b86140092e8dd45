use clap::Parser;
use serde_json::json;

use unity_bridge::config;
use unity_bridge::lifecycle::startup;

#[derive(Parser)]
#[command(name = "bridge-check")]
#[command(about = "Validate the bridge environment before deployment", long_about = None)]
struct Cli {
    /// Include the fully-resolved configuration in the report.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config::Loaded { config, defaulted } = config::load();
    let report = startup::preflight(&config).await;

    let mut output = json!({
        "passed": report.passed(),
        "config_errors": report.config_errors,
        "defaulted_fields": defaulted,
        "listen": {
            "addr": report.listen_addr,
            "bindable": report.listen_bindable,
            "bind_error": report.bind_error,
        },
        "editor_addr": config.network.editor_addr(),
        "telemetry_enabled": config.telemetry.enabled,
    });
    if cli.verbose {
        output["config"] = serde_json::to_value(&config).unwrap_or_default();
    }

    match serde_json::to_string_pretty(&output) {
        Ok(rendered) => println!("{}", rendered),
        Err(err) => eprintln!("Failed to render report: {}", err),
    }

    std::process::exit(if report.passed() { 0 } else { 1 });
}
