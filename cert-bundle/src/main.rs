use std::process::ExitCode;

use tracing_subscriber::{filter::LevelFilter, EnvFilter};
mod args;

use args::{CertificateCommand, Options};

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::builder()
				.with_default_directive(LevelFilter::WARN.into())
				.from_env_lossy(),
		)
		.with_writer(std::io::stderr)
		.init();

	let result = match args::options().run() {
		Options::Certificate(CertificateCommand::Bundle { files }) => cert_bundle::run(&files),
	};

	match result {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			tracing::debug!(error = ?e, "bundle failed");
			eprintln!("error: {e}");
			ExitCode::FAILURE
		},
	}
}
