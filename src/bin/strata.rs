use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use strata_wm::actor::reactor::{self, Reactor};
use strata_wm::common::config::Config;
use strata_wm::common::{die, log};
use strata_wm::sys::scene::RecordingScene;
use tracing::{info, warn};

#[derive(Parser)]
struct Cli {
    /// Drive the reactor from a recording made with --record.
    #[arg(long)]
    replay: PathBuf,

    /// Record reactor events to the specified file path. Overwrites the file if
    /// exists.
    #[arg(long)]
    record: Option<PathBuf>,

    /// Print the final arrangement as JSON once the recording is exhausted.
    #[arg(long)]
    dump: bool,
}

fn main() -> anyhow::Result<()> {
    let opt: Cli = Parser::parse();

    if std::env::var_os("RUST_BACKTRACE").is_none() {
        // SAFETY: We are single threaded at this point.
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }
    log::init_logging();
    install_panic_hook();

    let mut config = Config::default();
    for issue in config.validate() {
        warn!("config: {issue}");
    }
    let fixed = config.auto_fix_values();
    if fixed > 0 {
        warn!("Adjusted {fixed} out-of-range config values");
    }

    let record = reactor::Record::new(opt.record.as_deref())
        .with_context(|| format!("creating recording {:?}", opt.record))?;
    let scene = RecordingScene::new();
    let mut reactor = Reactor::new(config, Box::new(scene), record);

    let (events_tx, events_rx) = strata_wm::actor::channel();
    let path = opt.replay.clone();
    let reader = std::thread::spawn(move || {
        reactor::replay(&path, |event| events_tx.send(event))
    });

    if let Err(err) = reactor.run(events_rx) {
        die(err);
    }

    match reader.join() {
        Ok(result) => {
            result.with_context(|| format!("replaying {}", opt.replay.display()))?
        }
        Err(_) => anyhow::bail!("replay thread panicked"),
    }
    info!("replay finished");

    if opt.dump {
        println!("{}", serde_json::to_string_pretty(&reactor.snapshot())?);
    }
    Ok(())
}

#[cfg(panic = "unwind")]
fn install_panic_hook() {
    // Abort on panic instead of propagating panics to the main thread.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        original_hook(info);
        std::process::abort();
    }));
}

#[cfg(not(panic = "unwind"))]
fn install_panic_hook() {}
