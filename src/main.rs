use std::path::Path;
use std::process;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use xbasic::cli::{check_script_path, CliArgs};
use xbasic::host::StdHost;
use xbasic::repl;
use xbasic::runner::Runtime;

fn main() {
    let args = CliArgs::parse();
    init_tracing(&args);

    let mut runtime = Runtime::new(StdHost);

    if let Some(file_path) = &args.file {
        run_file(&mut runtime, file_path, args.pretty);
    }

    if args.wants_shell() {
        repl::start(runtime, args.pretty);
    }
}

fn init_tracing(args: &CliArgs) {
    let filter = EnvFilter::try_from_env("XBASIC_LOG")
        .unwrap_or_else(|_| EnvFilter::new(args.default_log_filter()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn run_file(runtime: &mut Runtime<StdHost>, path: &str, pretty: bool) {
    if let Err(message) = check_script_path(path) {
        eprintln!("{}", message);
        process::exit(1);
    }

    if !Path::new(path).exists() {
        eprintln!("Error: File '{}' not found", path);
        process::exit(1);
    }

    if let Err(error) = runtime.run_file(path) {
        repl::show_error(&error, pretty);
        process::exit(1);
    }
}
