use std::env;

use anyhow::{Context, Result};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

/// Names a log4rs YAML file that replaces the built-in stderr logger.
pub const LOG_CONFIG_VAR: &str = "NETCFG_AUDIT_LOG";

const PATTERN: &str = "{d(%H:%M:%S%.3f)} {h({l:<5})} {t} - {m}{n}";

pub fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Logs go to stderr so they never mix into a report on stdout.
pub fn init(verbose: u8) -> Result<()> {
    if let Ok(path) = env::var(LOG_CONFIG_VAR) {
        return log4rs::init_file(&path, Default::default())
            .with_context(|| format!("failed to initialize logging from {path}"));
    }

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level_for(verbose)))
        .context("invalid logging configuration")?;
    log4rs::init_config(config).context("failed to initialize logging")?;
    Ok(())
}
