use std::env;
use std::process;
use std::sync::Arc;

use satya_lib::config::{self, GuardianConfig};
use satya_lib::models::{ConditionProfile, GuardianResult, RawInput};
use satya_lib::pipeline::extraction::HttpFetcher;
use satya_lib::pipeline::inference::OllamaClient;
use satya_lib::pipeline::Guardian;

fn usage() -> ! {
    eprintln!("Usage: satya <ingredients | image path | product URL> [--condition C]... [--text]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --condition  A declared health condition; repeat or comma-separate");
    eprintln!("  --text       Print the final message instead of the JSON result");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  satya \"Maida, Sugar, Palm Oil, Salt\" --condition celiac");
    eprintln!("  satya label.jpg --condition \"type 2 diabetes\" --condition \"milk allergy\"");
    process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }

    let input = args[1].clone();
    let mut conditions: Vec<String> = Vec::new();
    let mut text_output = false;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--condition" => {
                if i + 1 < args.len() {
                    conditions.extend(
                        args[i + 1]
                            .split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty()),
                    );
                    i += 2;
                } else {
                    eprintln!("Error: --condition requires a value");
                    process::exit(1);
                }
            }
            "--text" => {
                text_output = true;
                i += 1;
            }
            "--help" | "-h" => usage(),
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
    }

    satya_lib::init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = GuardianConfig::load().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    // Blocking HTTP clients must be built outside the async runtime.
    let client = OllamaClient::from_config(&config).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    let fetcher = HttpFetcher::new(config.fetch_timeout_secs).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    let guardian = Guardian::new(Arc::new(client), Arc::new(fetcher), &config);
    let profile = ConditionProfile::from_declared(&conditions);

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Error: cannot start runtime: {e}");
        process::exit(1);
    });
    let result = runtime.block_on(guardian.evaluate(RawInput::text(input), &profile));
    drop(runtime);

    if text_output {
        print_human(&result);
        return;
    }
    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: cannot serialize result: {e}");
            process::exit(1);
        }
    }
}

fn print_human(result: &GuardianResult) {
    println!("{}", result.final_message);
    println!();
    println!("Severity: {}", result.severity);
    if !result.normalized.is_empty() {
        let names: Vec<&str> = result
            .normalized
            .iter()
            .map(|i| i.canonical_name.as_str())
            .collect();
        println!("Ingredients: {}", names.join(", "));
    }
}
