use tracing::info;
use tracing_subscriber;

use clap::{value_t, values_t, App, Arg};

use zfx_thaw::server::{node, Settings};
use zfx_thaw::Result;

use actix::Arbiter;
use std::path::PathBuf;

async fn wait_for_signal() -> &'static str {
    if cfg!(unix) {
        use futures::future::FutureExt;
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigint, mut sigterm) =
            match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
                (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
                _ => return "broken signal handler",
            };

        futures::select! {
            _ = sigint.recv().fuse() => "SIGINT",
            _ = sigterm.recv().fuse() => "SIGTERM"
        }
    } else {
        let _ = tokio::signal::ctrl_c().await;
        "Ctrl+C"
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_level(false)
        .with_target(false)
        .without_time()
        .compact()
        .with_max_level(tracing::Level::INFO)
        .init();

    let matches = App::new("zfx-thaw")
        .version("0.1")
        .author("zero.fx labs ltd.")
        .about("Bootstraps the vertex DAG of a zero.fx chain")
        .arg(
            Arg::with_name("settings")
                .short("s")
                .long("settings")
                .value_name("SETTINGS_FILE")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("listener-ip")
                .short("a")
                .long("listener-ip")
                .value_name("LISTENER_IP")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("bootstrap-peer")
                .short("b")
                .long("bootstrap-peer")
                .value_name("BOOTSTRAP_PEER")
                .multiple(true),
        )
        .arg(
            Arg::with_name("home-dir")
                .short("d")
                .long("home-dir")
                .value_name("HOME_DIR")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("linearize-on-startup")
                .long("linearize-on-startup")
                .help("Linearizes the locally accepted DAG without contacting any peer"),
        )
        .get_matches();

    let mut settings = match matches.value_of("settings") {
        Some(path) => Settings::from_file(path)?,
        None => Settings::new()?,
    };
    if matches.is_present("listener-ip") {
        settings.listener_ip =
            value_t!(matches.value_of("listener-ip"), String).unwrap_or_else(|e| e.exit());
    }
    if matches.is_present("bootstrap-peer") {
        settings.bootstrap_peers =
            values_t!(matches.values_of("bootstrap-peer"), String).unwrap_or_else(|e| e.exit());
    }
    if matches.is_present("linearize-on-startup") {
        settings.bootstrap.linearize_on_startup = true;
    }
    let home_dir = match matches.value_of("home-dir") {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir().unwrap_or_default().join(".zfx-thaw"),
    };

    let sys = actix::System::new();
    sys.block_on(async move {
        let shutdown = node::run(settings, &home_dir)?;

        // The bootstrapper may keep its arbiter busy while executing jobs, signals are
        // handled on an arbiter of their own.
        let signals = Arbiter::new();
        let token = shutdown.clone();
        let _ = signals.spawn(async move {
            let sig = wait_for_signal().await;
            info!(target: "zfx-thaw", "Got {}, stopping...", sig);
            token.cancel();
        });

        shutdown.cancelled().await;
        actix::System::current().stop();
        Ok::<(), zfx_thaw::Error>(())
    })?;
    sys.run()?;

    Ok(())
}
