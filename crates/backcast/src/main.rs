use backcast::{Cli, Settings, build_engine, default_config_path, init_logging, run};
use clap::Parser;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();
    let _log_guard = init_logging(args.log_dir.as_deref(), &args.log_level)?;

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let settings = Settings::load(&config_path)?;
    let data_dir = settings.resolve_data_dir(args.data_dir.as_deref());

    let engine = build_engine(&settings, &data_dir)?;
    let output = run(&engine, &args.command)?;
    println!("{output}");

    tracing::info!("backcast finished");
    Ok(())
}
