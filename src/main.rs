use clap::Parser;
use committer_coverage::api::Error;
use committer_coverage_app::Args;

/// Reports recent committers not covered by Advanced Security licenses
#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let analysis = committer_coverage_app::analyze(&args).await?;
    committer_coverage_app::write_report(&analysis, &args.output)?;

    println!("Report generated: {}", args.output.display());
    Ok(())
}
