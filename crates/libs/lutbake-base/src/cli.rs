//! Command line helpers shared by the binaries.
use log::LevelFilter;
use std::time::SystemTime;

/// Arguments shared by every binary of the workspace.
#[derive(clap::Args, Debug, Clone)]
pub struct CommonArgs {
    /// Whether to print the elapsed time since launch in front of each log
    /// line.
    #[clap(long, global = true, default_value_t = false)]
    pub log_timestamp: bool,

    /// Setting logging verbosity level (higher for more details)
    ///   0 - error
    ///   1 - warn + error
    ///   2 - info + warn + error
    ///   3 - debug + info + warn + error
    ///   4 - trace + debug + info + warn + error
    #[clap(short, long, global = true, default_value_t = 1, verbatim_doc_comment)]
    pub log_level: u8,
}

/// Parses the arguments, returns the arguments and the launch time.
///
/// # Arguments
///
/// * `name` - The name of the program.
///
/// # Returns
///
/// * `args` - The parsed arguments.
/// * `launch_time` - The launch time of the program.
pub fn parse_args<T: clap::Parser>(name: &str) -> (T, SystemTime) {
    let args = T::parse();
    let launch_time = SystemTime::now();
    log::info!(
        "{} launched at {} on {}.",
        name,
        chrono::DateTime::<chrono::Utc>::from(launch_time),
        std::env::consts::OS
    );

    (args, launch_time)
}

/// A filter for the logger.
///
/// This is a tuple of a module name and a log level filter.
pub type LogFilter<'a> = (&'a str, LevelFilter);

/// Initialises logging settings.
///
/// # Arguments
///
/// * `timestamp` - The base time for the elapsed time printed in front of
///   each line; `None` disables it.
/// * `log_level` - The top level log level of the program. See
///   [`log_filter_from_level`] for more details.
/// * `filters` - Per-module overrides of the log level.
pub fn setup_logging(timestamp: Option<SystemTime>, log_level: u8, filters: &[LogFilter]) {
    use std::io::Write;
    let mut builder = env_logger::builder();
    builder.format(move |buf, record| {
        let top_level_module = record
            .module_path()
            .and_then(|path| path.split("::").next())
            .unwrap_or("unknown");
        match timestamp.and_then(|t| t.elapsed().ok()) {
            Some(duration) => {
                let millis = duration.as_millis() % 1000;
                let seconds = duration.as_secs() % 60;
                let minutes = (duration.as_secs() / 60) % 60;
                let hours = (duration.as_secs() / 60) / 60;
                writeln!(
                    buf,
                    "{}:{:02}:{:02}.{:03} {:5} [{}]: {}",
                    hours,
                    minutes,
                    seconds,
                    millis,
                    record.level(),
                    top_level_module,
                    record.args()
                )
            },
            None => {
                writeln!(
                    buf,
                    "{:5} [{}]: {}",
                    record.level(),
                    top_level_module,
                    record.args()
                )
            },
        }
    });
    for (module, level) in filters {
        builder.filter(Some(module), *level);
    }
    builder
        .filter_level(log_filter_from_level(log_level))
        .init();
}

/// Converts a verbosity level to a log filter.
pub fn log_filter_from_level(level: u8) -> LevelFilter {
    match level {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
