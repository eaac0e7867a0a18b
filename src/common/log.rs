use std::fmt::Display;

use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;
use tracing_tree::time::Uptime;

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let tree = HierarchicalLayer::default()
        .with_indent_lines(true)
        .with_indent_amount(2)
        .with_targets(true)
        .with_timer(Uptime::default())
        .with_deferred_spans(true);
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = Registry::default().with(filter).with(tree).try_init();
}

/// Reports an unrecoverable condition and terminates the process.
pub fn die(message: impl Display) -> ! {
    error!("{message}");
    eprintln!("{message}");
    std::process::exit(1);
}
