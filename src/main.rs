use aranet_logger::app::{self, Options, RunError};
use aranet_logger::sink::display::DisplaySink;
use aranet_logger::sink::{Sink, SinkError};
use clap::Parser;
use std::panic::{self, PanicHookInfo};

#[cfg(not(feature = "bluer"))]
compile_error!("the aranet-logger binary requires the 'bluer' backend feature");

/// Exit codes for the application
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_PANIC: i32 = 2;

/// Pick the sink the run writes to: a DuckDB log when `--db` is given,
/// stdout otherwise.
fn build_sink(options: &Options) -> Result<Box<dyn Sink>, SinkError> {
    let Some(path) = &options.db else {
        return Ok(Box::new(DisplaySink::new(std::io::stdout())));
    };

    #[cfg(feature = "duckdb")]
    {
        use aranet_logger::sink::duckdb::DuckDbSink;
        Ok(Box::new(DuckDbSink::open(path, &options.table)?))
    }
    #[cfg(not(feature = "duckdb"))]
    {
        let _ = path;
        Err(SinkError::Unavailable("duckdb".to_string()))
    }
}

/// Wire the real scanner, the selected sink, stderr, and Ctrl-C into the
/// core run loop.
async fn run(options: Options) -> Result<u64, RunError> {
    let mut sink = build_sink(&options)?;
    let scanner = aranet_logger::RealScanner;
    let mut err = std::io::stderr();

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    app::run_with_io(options, &scanner, sink.as_mut(), &mut err, shutdown).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set up panic hook to ensure clean exit codes for process managers
    // (e.g., systemd) that monitor exit status
    panic::set_hook(Box::new(move |info: &PanicHookInfo| {
        eprintln!("Panic! {}", info);
        std::process::exit(EXIT_PANIC);
    }));

    let options = Options::parse();
    let verbose = options.verbose;

    match run(options).await {
        Ok(recorded) => {
            if verbose {
                eprintln!("recorded {recorded} advertisements");
            }
            std::process::exit(EXIT_SUCCESS);
        }
        Err(why) => {
            eprintln!("error: {}", why);
            std::process::exit(EXIT_ERROR);
        }
    }
}
