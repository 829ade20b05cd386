use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Installs a stderr tracing subscriber.
///
/// `directives` takes precedence over `RUST_LOG`; with neither present no
/// subscriber is installed. Safe to call more than once.
pub fn init(directives: Option<&str>) {
    INIT.call_once(|| {
        let filter = match directives {
            Some(directives) => EnvFilter::try_new(directives).map_err(|e| e.to_string()),
            None if std::env::var_os("RUST_LOG").is_some() => {
                EnvFilter::try_from_default_env().map_err(|e| e.to_string())
            }
            None => return,
        };

        let filter = match filter {
            Ok(filter) => filter,
            Err(error) => {
                eprintln!("ignoring invalid log filter: {}", error);
                return;
            }
        };

        let installed = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .try_init();

        if let Err(error) = installed {
            eprintln!("could not install log subscriber: {}", error);
        }
    });
}
