use std::io::{self, Write};

use bb_cli::{CliHost, Opts};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    if let Some(log) = &opts.log {
        let file = std::fs::OpenOptions::new().create(true).append(true).open(log)?;
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_env_filter(EnvFilter::from_env("BB_LOG"))
            .init();
    }

    let mut host = CliHost::default();
    let result = bb_cli::run(&opts, &mut host);

    io::stdout().lock().write_all(host.output().as_bytes())?;
    let mut stderr = io::stderr().lock();
    for err in host.errors() {
        writeln!(stderr, "error: {err}")?;
    }

    if let Err(err) = &result {
        tracing::error!(?err, "bb failed");
    }
    result
}
