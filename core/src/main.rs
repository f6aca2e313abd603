use std::{process::ExitCode, rc::Rc};

use common::{clock::SystemClock, env_config::Config, error::Res};
use subs::LifecycleController;

fn run(config: &Config) -> Res<()> {
    // init snapshot + controller
    let snapshot = db::setup(&config.snapshot_path)?;
    let controller = LifecycleController::open(
        snapshot,
        Rc::new(SystemClock),
        config.notification_interval(),
    )?;

    // list the roster as it stands right now
    let rows = controller.rows(&config.search_term);
    log::info!(
        "Subscribers: {} total, {} matching {:?}",
        controller.total(),
        rows.len(),
        config.search_term
    );
    for row in rows {
        log::info!(
            "{} | {} | {} | {} | {} | start {} | expiry {} | {} | {}",
            row.referral_id,
            row.user_name,
            row.email,
            row.phone_number,
            row.trading_view_id,
            row.start_date,
            row.expiry_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            row.subscription_status,
            row.remaining_time
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    // get env vars
    let config = Config::from_env();

    // init logger
    if config.console_logging_enabled {
        if let Err(e) = logger::setup(&config.log_file, config.log_level) {
            eprintln!("Failed to set up logger: {}", e);
            return ExitCode::FAILURE;
        }
    }

    log::debug!("Starting roster in {} mode", config.environment);
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e.to_user_message());
            ExitCode::FAILURE
        }
    }
}
