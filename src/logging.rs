use crate::config::data_dir;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Installs the global subscriber. The TUI owns the terminal, so it logs to
/// `data/bharat-ev-cost.log` instead of stderr.
pub fn init_logging(target: LogTarget) {
    let result = match target {
        LogTarget::Stderr => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .compact()
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LogTarget::File => {
            let dir = match data_dir() {
                Ok(dir) => dir,
                Err(e) => {
                    eprintln!("Failed to init logging. Couldn't determine data dir {e}");
                    return;
                }
            };
            let file_appender = tracing_appender::rolling::never(dir, "bharat-ev-cost.log");
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                )
                .with_writer(file_appender)
                .with_ansi(false)
                .compact()
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    };

    match result {
        Ok(()) => info!("Logging initialised"),
        Err(e) => eprintln!("Failed to init logging. {e}"),
    }
}
