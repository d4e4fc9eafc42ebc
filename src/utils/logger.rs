use colored::{ColoredString, Colorize};
use env_logger::Builder;
use log::Level;
use std::io::Write;

/// Colors used for run summaries.
pub struct Colors;

impl Colors {
    pub const MATCHED: &'static str = "green";
    pub const MISMATCHED: &'static str = "red";
    pub const SKIPPED: &'static str = "yellow";

    pub fn colorize(color: &str, text: &str) -> ColoredString {
        text.color(color)
    }
}

pub fn setup_logging(verbose: bool) {
    log_builder(verbose, std::env::var("RUST_LOG").ok().as_deref()).init();
}

/// Logger builder with the crate's format. `env_filters` uses `RUST_LOG` syntax and is applied
/// after the built-in levels, so its directives win.
pub fn log_builder(verbose: bool, env_filters: Option<&str>) -> Builder {
    use log::LevelFilter;

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Warn) // Default: only warnings from dependencies
        .filter_module(env!("CARGO_PKG_NAME"), level); // Our crate: use requested level
    if let Some(filters) = env_filters {
        builder.parse_filters(filters);
    }
    builder.format(|buf, record| {
        let name = env!("CARGO_PKG_NAME");
        let thread = std::thread::current();
        let thread_name = thread.name().unwrap_or("main");
        let line = match record.level() {
            Level::Error | Level::Warn => {
                let level_str = match record.level() {
                    Level::Warn => "WARN".yellow(),
                    Level::Error => "ERROR".red(),
                    _ => unreachable!(),
                };
                format!(
                    "[{} {} {}] {}",
                    name.cyan(),
                    level_str,
                    thread_name.white(),
                    record.args()
                )
            }
            Level::Debug | Level::Trace => format!(
                "[{} {}] {}",
                name.cyan(),
                thread_name.dimmed(),
                record.args()
            ),
            Level::Info => format!("[{}] {}", name.cyan(), record.args()),
        };
        writeln!(buf, "{}", line)
    });
    builder
}
