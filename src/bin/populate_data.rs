use agrisim::config::{run_options::get_args, Config};
use agrisim::driver::populate::run_population;
use agrisim::sensors::generator::ReadingGenerator;
use agrisim::time::RealTimeProvider;
use agrisim::transport::api::ApiClient;
use agrisim::utils::start_log;
use std::error::Error;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    start_log::<RealTimeProvider>(None);

    let args = get_args();
    if args.help {
        return Ok(());
    }
    let cfg = Config::load(&args)?;

    let api = ApiClient::new(cfg.api.clone())?;
    info!(
        api = %api.base_url(),
        fields = cfg.fields.len(),
        days = cfg.backfill.days,
        step_hours = cfg.backfill.step_hours,
        "Agricultural IoT data population tool"
    );

    let mut generator = ReadingGenerator::new(cfg.simulation.seed);
    let report = run_population(&api, &mut generator, &cfg, &RealTimeProvider).await?;

    info!(
        historical = report.historical.sent,
        current = report.current,
        "Done. Query the data with: curl {}/sensors/{}",
        api.base_url(),
        cfg.fields[0].id
    );
    Ok(())
}
