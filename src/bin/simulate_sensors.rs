use agrisim::config::{run_options::get_args, Config};
use agrisim::driver::live::run_simulator;
use agrisim::sensors::generator::ReadingGenerator;
use agrisim::time::RealTimeProvider;
use agrisim::transport::mqtt::BrokerPublisher;
use agrisim::utils::start_log;
use std::error::Error;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    start_log::<RealTimeProvider>(None);

    let args = get_args();
    if args.help {
        return Ok(());
    }
    let cfg = Config::load(&args)?;

    info!("Agricultural IoT sensor simulator");
    let publisher = BrokerPublisher::connect(&cfg.mqtt).await.inspect_err(|e| {
        error!(error = %e, host = %cfg.mqtt.host, port = cfg.mqtt.port, "Failed to connect to MQTT broker.");
    })?;

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupt received."),
            Err(e) => error!(error = %e, "Unable to listen for Ctrl+C, stopping."),
        }
        let _ = stop_tx.send(true);
    });
    info!("Press Ctrl+C to stop");

    let mut generator = ReadingGenerator::new(cfg.simulation.seed);
    let report = run_simulator(
        &publisher,
        &mut generator,
        &cfg.fields,
        &RealTimeProvider,
        stop_rx,
        cfg.simulation.interval(),
        args.ticks,
    )
    .await;

    info!(ticks = report.ticks, published = report.published, failed = report.failed, "Simulator stopped.");
    Ok(())
}
