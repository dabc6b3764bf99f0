use env_logger::{Builder, Env};

/// Default filter for a `-v` count; `RUST_LOG` still takes precedence.
pub fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

pub fn init_logging(verbosity: u8) {
    Builder::from_env(Env::default().default_filter_or(default_level(verbosity)))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();
}
