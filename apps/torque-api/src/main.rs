use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = torque_api::Args::parse();

	torque_api::run(args).await
}
