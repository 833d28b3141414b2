use clap::Parser;
use moonphase::config::toml_config::TomlConfig;
use moonphase::utils::{logger, validation::Validate};
use moonphase::{LocalClock, MeeusEphemeris, PhaseQuery, PhaseService};

#[derive(Parser)]
#[command(name = "phase-query")]
#[command(about = "Print the moon phase result for a date without starting the server")]
struct Args {
    /// Date in YYYY-MM-DD format; today when omitted
    #[arg(short, long)]
    date: Option<String>,

    /// Path to a TOML configuration file for the image set
    #[arg(short, long)]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let config = match &args.config {
        Some(path) => TomlConfig::from_file(path)?,
        None => TomlConfig::default(),
    };
    config.validate()?;

    let service = PhaseService::new(MeeusEphemeris::new(), LocalClock, config.image_set());
    let query = PhaseQuery {
        date: args.date.clone(),
    };

    match service.phase_for(&query) {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(2);
        }
    }
}
