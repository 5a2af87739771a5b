//! Global logging setup.

use std::{env, panic};

use tracing::{error, info, trace};
use tracing_subscriber::{
    fmt::{self, time::uptime},
    prelude::*,
    EnvFilter, Registry,
};

/// Our crate at debug, everything else at warn.
const DEFAULT_FILTER: &str = "warn,joint_car=debug";

/// Installs a `tracing` subscriber writing to stdout. `RUST_LOG` directives
/// are appended to the default filter. Panics are logged too.
pub fn init_logging() {
    let format = fmt::format()
        .compact()
        .with_timer(uptime())
        .with_line_number(true);
    let stdout_log = fmt::layer().event_format(format);

    let mut filter = DEFAULT_FILTER.to_owned();
    if let Ok(env_filter) = env::var(EnvFilter::DEFAULT_ENV) {
        filter.push(',');
        filter.push_str(&env_filter);
    }

    let subscriber = Registry::default()
        .with(EnvFilter::new(filter))
        .with(stdout_log);
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // host (e.g. python) already installed one
        return;
    }
    info!("logging initialized");

    panic::set_hook(Box::new(|info| {
        error!("{}", info);
    }));
    trace!("installed panic hook");
}
