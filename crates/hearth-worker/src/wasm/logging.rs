//! `tracing` output for the Workers runtime.

use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use tracing_web::MakeWebConsoleWriter;
use worker::Env;

use super::env::env_string;

const DEFAULT_FILTER: &str = "info";

static INIT: Once = Once::new();

/// Install the console subscriber once per isolate. `RUST_LOG` takes the usual
/// `EnvFilter` syntax.
pub fn init_tracing(env: &Env) {
    INIT.call_once(|| {
        let filter = env_string(env, "RUST_LOG")
            .and_then(|spec| EnvFilter::try_new(spec).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

        // No timer: SystemTime panics on wasm32 and the runtime stamps each line anyway.
        let layer = fmt::layer()
            .with_ansi(false)
            .without_time()
            .with_writer(MakeWebConsoleWriter::new());

        let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
    });
}
