use crowd_sim::adapters::outbound::{init_combined_logger, init_console_logger, BufferedLogger, JsonLinesEventLog};
use crowd_sim::application::{CrowdSimulation, SimulationPorts};
use crowd_sim::domains::crowd::{CrowdEvent, CrowdStatistics};
use crowd_sim::domains::logger::DynLogger;
use crowd_sim::Config;
use std::error::Error;
use tokio::time::{interval, Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn record(
    simulation: &CrowdSimulation,
    events: Vec<CrowdEvent>,
    stats: &mut CrowdStatistics,
    event_log: Option<&JsonLinesEventLog>,
) -> Result<(), Box<dyn Error>> {
    events.iter().for_each(|event| stats.apply_event(event));
    if let Some(log) = event_log {
        let envelopes = simulation.envelopes(&events)?;
        log.append(&envelopes).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting crowd simulation");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            Config::from_file(&path).await?
        }
        None => {
            info!("No configuration file given, using the built-in scene");
            Config::default()
        }
    };

    let sink = match &config.simulation.log_file {
        Some(path) => init_combined_logger(path),
        None => init_console_logger(),
    };
    let logger = BufferedLogger::spawn(sink, 256);

    let outcome = run(&config, logger.clone()).await;
    logger.flush().await;
    if logger.dropped() > 0 {
        info!("{} log messages were dropped under load", logger.dropped());
    }
    outcome
}

async fn run(config: &Config, logger: DynLogger) -> Result<(), Box<dyn Error>> {
    let mut simulation = CrowdSimulation::new(config.simulation_settings(), SimulationPorts::headless(), logger);
    for definition in config.path_definitions() {
        simulation.register_path(definition);
    }
    let populated = simulation.populate_all();
    info!("Populated {} agents on {} paths", populated, simulation.registry().len());

    let event_log = config.simulation.event_log.as_ref().map(JsonLinesEventLog::new);
    let mut stats = CrowdStatistics::new();
    let initial = simulation.take_events();
    record(&simulation, initial, &mut stats, event_log.as_ref()).await?;

    let dt = 1.0 / config.simulation.tick_rate;
    let limit = config.simulation.ticks;
    // An unbounded run is always paced so ctrl-c gets a chance to fire.
    let paced = config.simulation.realtime || limit == 0;
    let report_every = (config.simulation.tick_rate * 10.0).max(1.0) as u64;
    let mut ticker = interval(Duration::from_secs_f32(dt));
    let mut tick: u64 = 0;

    while limit == 0 || tick < limit {
        if paced {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, shutting down");
                    break;
                }
            }
        }

        simulation.tick(dt);
        tick += 1;

        let events = simulation.take_events();
        record(&simulation, events, &mut stats, event_log.as_ref()).await?;

        if tick % report_every == 0 {
            info!(
                t = simulation.elapsed(),
                agents = simulation.agents().len(),
                divergences = stats.divergences,
                completed = stats.routes_completed,
                "progress"
            );
        }
    }

    for path in simulation.registry().paths() {
        let traffic = stats.per_path.get(&path.id).cloned().unwrap_or_default();
        info!(
            "{} ({}): population {}, spawned {}, despawned {}, diverged in {}, out {}",
            path.name,
            path.id,
            simulation.population_on(path.id),
            traffic.spawned,
            traffic.despawned,
            traffic.diverged_in,
            traffic.diverged_out
        );
    }
    info!(
        "Finished after {:.1}s simulated: {} spawned, {} despawned, {} divergences ({} forced), {} settled",
        simulation.elapsed(),
        stats.spawned,
        stats.despawned,
        stats.divergences,
        stats.forced_divergences,
        stats.settled
    );

    Ok(())
}
