use clap::Parser;
use tracing::debug;

use bytepipe::endpoint::{self, ResolvedInput};
use bytepipe::error::RelayError;
use bytepipe::server::RelayServer;
use bytepipe::shutdown::{self, ShutdownFlag};
use bytepipe::{Args, args, logging, relay};

fn main() {
    let parsed = match Args::try_parse() {
        Ok(parsed) => parsed,
        Err(err) => {
            let code = args::exit_code_for(&err);
            let _ = err.print();
            std::process::exit(code);
        }
    };

    logging::init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            let err = RelayError::resolution("runtime", "tokio", err);
            eprintln!("{}", err.diagnostic());
            std::process::exit(err.exit_code());
        }
    };

    if let Err(err) = runtime.block_on(run(parsed)) {
        eprintln!("{}", err.diagnostic());
        std::process::exit(err.exit_code());
    }
}

async fn run(args: Args) -> Result<(), RelayError> {
    let config = args.into_config()?;

    // Input resolves first, then output; any failure here is fatal with
    // no partial-resolution retry.
    let input = endpoint::resolve_input(&config.input).await?;
    let sink = endpoint::resolve_output(&config.output).await?;

    match input {
        ResolvedInput::Source(mut source) => {
            let mut sink = sink;
            let copied = relay::copy(&mut source, &mut sink, config.buffer_size).await?;
            debug!(bytes = copied, "relay complete");
        }
        ResolvedInput::Listener(listener) => {
            let flag = ShutdownFlag::new();
            let _interrupt = shutdown::spawn_interrupt_listener(flag.clone());
            let server = RelayServer::new(listener, sink, config.buffer_size, flag);
            let copied = server.run().await?;
            debug!(bytes = copied, "server stopped");
        }
    }

    Ok(())
}
