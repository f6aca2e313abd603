use std::{fs::File, path::Path};

use colored::Colorize;

fn level_color(level: log::Level) -> &'static str {
    match level {
        log::Level::Info => "green",
        log::Level::Warn => "yellow",
        log::Level::Error => "red",
        log::Level::Debug => "magenta",
        log::Level::Trace => "bright black",
    }
}

/// Sends log records to stdout and to a fresh `log_file`.
pub fn setup(log_file: &Path, level: log::LevelFilter) -> Result<(), fern::InitError> {
    File::create(log_file).map_err(fern::InitError::Io)?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%H:%M:%S]"),
                record.target(),
                record.level().to_string().color(level_color(record.level())),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .chain(fern::log_file(log_file)?)
        .apply()?;
    Ok(())
}
