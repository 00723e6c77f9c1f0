use envelope_core::container::ContainerReader;
use envelope_core::policy::{VerificationConfig, VerificationPolicy};
use envelope_core::signature::Ed25519DetachedVerifier;
use envelope_core::verification::Outcome;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("usage: container_verifier <path/to/container.zip> [config.json]");
        std::process::exit(2);
    }
    let path = std::path::Path::new(&args[1]);

    let config = match args.get(2) {
        Some(p) => VerificationConfig::from_path(std::path::Path::new(p)),
        None => VerificationConfig::default_v1(),
    };
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            std::process::exit(1);
        }
    };
    let verifier = match Ed25519DetachedVerifier::from_hex_keys(&config.trusted_signer_keys) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("config error: {}", e);
            std::process::exit(1);
        }
    };
    let policy = match VerificationPolicy::new(&config, &verifier) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("config error: {}", e);
            std::process::exit(1);
        }
    };

    let container = match ContainerReader::read_zip(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("container error: {}", e);
            std::process::exit(1);
        }
    };

    let verdict = policy.verify(&container);
    match serde_json::to_string_pretty(&verdict) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("output error: {}", e);
            std::process::exit(1);
        }
    }
    if verdict.overall == Outcome::NOK {
        std::process::exit(1);
    }
}
