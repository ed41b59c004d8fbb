use std::process::ExitCode;
use std::sync::Arc;

use alive_server::{
    DevServer, Launch, PreviewServer, Resolution, Resolver, TerminalAction, cli,
    schedule_shutdown,
};
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Report panics as a one-line diagnostic before the default hook runs
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let payload = panic_info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("unknown panic");

        match panic_info.location() {
            Some(location) => eprintln!(
                "{}: internal error at {}:{}: {}",
                cli::NAME,
                location.file(),
                location.line(),
                message
            ),
            None => eprintln!("{}: internal error: {}", cli::NAME, message),
        }

        // RUST_BACKTRACE=1 still prints the backtrace
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", cli::NAME, e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let resolver = Resolver::from_env()?;

    let launch = match resolver.resolve(args.as_slice())? {
        Resolution::Terminal(TerminalAction::Help) => {
            println!("{}", cli::usage());
            return Ok(());
        }
        Resolution::Terminal(TerminalAction::Version) => {
            println!("{}", cli::version_line());
            return Ok(());
        }
        Resolution::Start(launch) => launch,
    };

    let rt = Runtime::new()?;
    rt.block_on(serve(launch))
}

async fn serve(launch: Launch) -> anyhow::Result<()> {
    let Launch {
        config,
        shutdown_after,
    } = launch;

    let server = Arc::new(PreviewServer::new());
    server.start(Arc::new(config))?;

    if let Some(delay) = shutdown_after {
        // Detached: the process ends once `stopped` resolves.
        let _ = schedule_shutdown(server.clone(), delay);
    }

    tokio::select! {
        _ = server.stopped() => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            server.shutdown();
        }
    }
    Ok(())
}
