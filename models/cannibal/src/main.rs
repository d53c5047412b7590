use std::env;

use tracing_subscriber::{
	fmt,
	prelude::*,
	EnvFilter
};

use rgk_models_cannibal::{
	read,
	CpjImportError,
	ImportCfg
};

fn main() -> Result<(), CpjImportError> {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new("warn,rgk_models_cannibal=info"));

	tracing_subscriber::registry()
		.with(fmt::layer())
		.with(filter)
		.init();

	for path in env::args().skip(1) {
		let doc = read(&path, &ImportCfg::default())?;

		println!("{}: {:#?}", path, doc);
	}

	Ok(())
}
