use anyhow::Result;
use clap::Parser;
use dream_skald::app::App;
use dream_skald::models::{Config, SeedMode};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "dream-skald")]
#[command(about = "Generate a poem and a matching image, and record them as a dream")]
struct CliArgs {
    /// Use this idea instead of a randomly composed seed.
    #[arg(long, value_name = "TEXT", value_parser = parse_seed_arg)]
    seed: Option<String>,

    /// Pick one of the classic hand-written seeds instead of composing one.
    #[arg(long, conflicts_with = "seed")]
    classic: bool,

    /// Run the whole pipeline without writing anything to disk.
    #[arg(long)]
    dry_run: bool,
}

fn parse_seed_arg(input: &str) -> std::result::Result<String, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Seed must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dream_skald=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting dream-skald");

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(mut config) => {
            if let Some(seed) = args.seed {
                config.fixed_seed = Some(seed);
            }
            if args.classic {
                config.seed_mode = SeedMode::Classic;
            }
            config.dry_run |= args.dry_run;
            config
        }
        Err(e) => {
            error!(kind = ?e.kind(), "Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    match App::new(&config) {
        Ok(app) => match app.run().await {
            Ok(record) => {
                info!("Dream recorded at {} ({})", record.timestamp, record.image_url);
                Ok(())
            }
            Err(e) => {
                error!(kind = ?e.kind(), "Dream generation failed: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!(kind = ?e.kind(), "Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_seed_arg, CliArgs};
    use clap::Parser;

    #[test]
    fn test_parse_seed_arg_trims() {
        assert_eq!(
            parse_seed_arg("  A saga told by the aurora  ").unwrap(),
            "A saga told by the aurora"
        );
    }

    #[test]
    fn test_parse_seed_arg_rejects_blank() {
        let err = parse_seed_arg("   ").unwrap_err();
        assert!(err.contains("empty"));
    }

    #[test]
    fn test_cli_flags() {
        let args = CliArgs::parse_from(["dream-skald", "--seed", "A raven", "--dry-run"]);
        assert_eq!(args.seed.as_deref(), Some("A raven"));
        assert!(args.dry_run);
        assert!(!args.classic);
    }

    #[test]
    fn test_classic_flag_conflicts_with_seed() {
        let args = CliArgs::parse_from(["dream-skald", "--classic"]);
        assert!(args.classic);

        assert!(CliArgs::try_parse_from(["dream-skald", "--classic", "--seed", "A raven"]).is_err());
    }
}
