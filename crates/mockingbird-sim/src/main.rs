//! Mockingbird CLI
//!
//! Lists the scenario catalog, or opens a scenario and evolves it in real
//! time, logging a dynamic snapshot after every update.

use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use mockingbird_sim::{Config, ScenarioCatalog, SimError, Simulator, SimulatorHandle};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mockingbird")]
#[command(about = "Run a procedural ATC training scenario")]
struct Args {
    /// Scenario category (defaults to the first one found)
    #[arg(short, long)]
    category: Option<String>,

    /// Scenario name (defaults to the first one in the category)
    #[arg(short, long)]
    scenario: Option<String>,

    /// Wall-clock seconds between updates
    #[arg(long, default_value = "1.0")]
    update_period: f64,

    /// Simulated seconds per wall-clock second
    #[arg(long, default_value = "1.0")]
    rate_of_time: f64,

    /// Stop after this many updates (runs until Ctrl-C if omitted)
    #[arg(short, long)]
    updates: Option<u64>,

    /// Override the configured tick size in milliseconds
    #[arg(long)]
    time_step_ms: Option<i64>,

    /// List categories and scenarios, then exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let mut config = Config::from_env();
    init_tracing(&config)?;

    let args = Args::parse();
    if let Some(time_step_ms) = args.time_step_ms {
        config.time_step_ms = time_step_ms;
    }

    let catalog = ScenarioCatalog::from_config(&config);
    if args.list {
        for category in catalog.list_categories()? {
            for scenario in catalog.list_scenarios(&category)? {
                println!("{category}/{scenario}");
            }
        }
        return Ok(());
    }

    ensure!(
        args.update_period.is_finite() && args.update_period > 0.0,
        "update period must be positive, got {}",
        args.update_period
    );
    ensure!(
        args.rate_of_time.is_finite() && args.rate_of_time > 0.0,
        "rate of time must be positive, got {}",
        args.rate_of_time
    );

    let category = match args.category {
        Some(category) => category,
        None => catalog
            .list_categories()?
            .into_iter()
            .next()
            .with_context(|| format!("no scenario categories in {}", catalog.root().display()))?,
    };
    let scenario = match args.scenario {
        Some(scenario) => scenario,
        None => catalog
            .list_scenarios(&category)?
            .into_iter()
            .next()
            .with_context(|| format!("no scenarios in category {category}"))?,
    };

    let info = catalog.info(&category, &scenario)?;
    info!(
        "Starting {} scenario {}/{} at {}",
        info.simulator, info.category, info.scenario_name, info.meta.start_time
    );

    let simulator = Simulator::open(&catalog, &category, &scenario, config.time_step())?;
    let (handle, task) = SimulatorHandle::spawn(simulator);

    let static_data = handle.static_data().await?;
    info!(
        "Scenario: {} sectors, {} fixes, bays {:?}",
        static_data.sectors.len(),
        static_data.fixes.len(),
        static_data.bay_names
    );

    let evolve_by = args.update_period * args.rate_of_time;
    let mut ticker = interval(Duration::from_secs_f64(args.update_period));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    ticker.tick().await;

    let mut update = 0_u64;
    while args.updates.is_none_or(|limit| update < limit) {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }

        match handle.evolve(evolve_by).await {
            Ok(_) => {}
            Err(SimError::Stopped) => break,
            // Failed actions are already recorded; keep the clock running
            Err(err) => warn!("Update {}: {} ({})", update + 1, err, err.error_code()),
        }

        let dynamic = handle.dynamic_data().await?;
        info!(
            "{} | tick {} | {} aircraft | {} pending actions",
            dynamic.time,
            dynamic.tick,
            dynamic.aircraft.len(),
            dynamic.pending_actions.len()
        );
        info!(snapshot = %serde_json::to_string(&dynamic)?, "Dynamic data");

        update += 1;
    }

    handle.shutdown().await.ok();
    let simulator = task.await?;
    info!(
        "Simulation finished at {} after {} ticks",
        simulator.dynamic_data().time,
        simulator.state().tick_count()
    );

    Ok(())
}

fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!(
            "mockingbird={0},mockingbird_sim={0}",
            config.log_level
        ))
    })?;

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
    Ok(())
}
