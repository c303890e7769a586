use anyhow::{Context, Result, anyhow};
use log::{debug, info};

use prodnet::analysis::log_diagnostics;
use prodnet::config::SimConfig;
use prodnet::engine::{Driver, FirstChooser, RandomChooser, SimulationEngine, TransitionChooser};
use prodnet::net::io::read_net;
use prodnet::options::{ChooserKind, Options};
use prodnet::report::SimulationReport;

fn main() -> Result<()> {
    if std::env::var("PN_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("PN_LOG")
            .write_style("PN_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let env_flags = std::env::var("PN_FLAGS").ok();
    let options = Options::parse_with_env(&args, env_flags.as_deref())
        .map_err(|err| anyhow!("{err}"))?;
    debug!("pn-sim options: {:?}", options);

    let config = SimConfig::load_from_file(&options.config_path)?;
    let net = read_net(&options.net_path)
        .with_context(|| format!("Failed to load net: {:?}", options.net_path))?;
    log_diagnostics(&net);

    let engine = SimulationEngine::from_config(net, &config)
        .context("Invalid marker pattern in config")?;
    let steps = options.steps.unwrap_or(config.max_steps);
    let seed = options.seed.or(config.seed);

    match options.chooser {
        ChooserKind::First => run_batch(Driver::new(engine, FirstChooser), steps, &options),
        ChooserKind::Random => {
            let chooser = seed.map_or_else(RandomChooser::from_entropy, RandomChooser::seeded);
            run_batch(Driver::new(engine, chooser), steps, &options)
        }
    }
}

fn run_batch<C: TransitionChooser>(mut driver: Driver<C>, steps: u64, options: &Options) -> Result<()> {
    if !driver.engine_mut().play() {
        info!("no transition enabled in the initial marking");
    }
    let fired = driver.run_for(steps);
    info!("fired {} transitions", fired);

    let engine = driver.into_engine();
    let report = SimulationReport::capture(&engine);

    if let Some(path) = &options.output {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report: {:?}", path))?;
    }
    if let Some(path) = &options.dot {
        engine
            .net()
            .write_dot(path)
            .with_context(|| format!("Failed to write dot file: {:?}", path))?;
    }
    if !options.quiet {
        println!("{}", report);
    }
    Ok(())
}
