use std::env;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Stdout gets a pretty ANSI layer; a non-ANSI copy goes to a daily log
/// file so scheduled runs leave a trail. The returned guard must stay alive
/// for the process lifetime.
pub fn init_logger() -> impl Drop {
    let filter = EnvFilter::new(env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string()));

    let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());
    let file_appender = tracing_appender::rolling::daily(log_dir, "transmission-sweep.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .pretty()
                .with_file(false)
                .without_time()
                .with_ansi(true),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter)
        .init();

    guard
}
