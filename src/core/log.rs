use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

const APP_TARGET: &str = "zai";

/// Crates whose warnings explain provider or cache failures.
const DEPENDENCY_TARGETS: [&str; 2] = ["reqwest", "fjall"];

/// Per-target levels. `--verbose` shows zai debug events plus dependency
/// warnings; with `RUST_LOG` set the env filter alone decides.
fn targets(verbose: bool, env_configured: bool) -> Targets {
    if env_configured {
        return Targets::new().with_default(LevelFilter::TRACE);
    }
    if !verbose {
        return Targets::new().with_default(LevelFilter::OFF);
    }
    DEPENDENCY_TARGETS
        .iter()
        .fold(Targets::new(), |t, target| t.with_target(*target, LevelFilter::WARN))
        .with_target(APP_TARGET, LevelFilter::DEBUG)
}

/// Installs the global subscriber on stderr, keeping stdout for tables.
/// Quiet unless `verbose` or `RUST_LOG` is set.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env().ok();
    let app_filter = targets(verbose, env_filter.is_some());
    let env_filter = env_filter.unwrap_or_else(|| EnvFilter::new("trace"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(app_filter)
        .with(env_filter)
        .init();
}
