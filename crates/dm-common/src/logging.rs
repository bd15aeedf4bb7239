use std::panic;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

pub const LOG_DIR_ENV: &str = "DM_LOG_DIR";
pub const LOG_BACKTRACE_ENV: &str = "DM_LOG_INCLUDE_BACKTRACE";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn flag_enabled(name: &str) -> bool {
    std::env::var(name)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Routes panics through `tracing` so they land in the same sink as ranking logs.
/// Installed once per process; later calls are no-ops.
pub fn install_tracing_panic_hook(app_name: &'static str) {
    static INSTALLED: OnceLock<()> = OnceLock::new();

    INSTALLED.get_or_init(|| {
        let default_hook = panic::take_hook();
        let include_backtrace = flag_enabled(LOG_BACKTRACE_ENV);

        panic::set_hook(Box::new(move |info| {
            let thread = std::thread::current();
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()));
            let message = info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".into());

            tracing::error!(
                application = app_name,
                run_id = crate::run_id::process_run_id(),
                thread = thread.name().unwrap_or("unnamed"),
                location = location.as_deref().unwrap_or("unknown"),
                panic_message = %message,
                "panic captured"
            );

            if include_backtrace {
                default_hook(info);
            }
        }));
    });
}

fn daily_file_writer(app_name: &str, dir: PathBuf) -> Option<BoxMakeWriter> {
    if let Err(err) = std::fs::create_dir_all(&dir) {
        eprintln!("{app_name}: cannot create {LOG_DIR_ENV} {}: {err}; logging to stdout", dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::daily(dir, format!("{app_name}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);
    Some(BoxMakeWriter::new(non_blocking))
}

/// Sets up the global subscriber. `RUST_LOG` drives filtering (default `info`).
///
/// With `DM_LOG_DIR` set, events go to `<DM_LOG_DIR>/<app>.log`, rotated daily.
/// Calling this twice keeps the first subscriber.
pub fn init_tracing_subscriber(app_name: &'static str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    let dir = std::env::var_os(LOG_DIR_ENV).map(PathBuf::from);
    let installed = match dir.and_then(|dir| daily_file_writer(app_name, dir.clone()).map(|w| (dir, w))) {
        Some((dir, writer)) => builder
            .with_writer(writer)
            .try_init()
            .map(|_| dir.join(format!("{app_name}.log")).display().to_string()),
        None => builder.try_init().map(|_| "stdout".to_string()),
    };

    if let Ok(sink) = installed {
        tracing::info!(
            application = app_name,
            run_id = crate::run_id::process_run_id(),
            sink = %sink,
            "tracing initialised"
        );
    }
}
