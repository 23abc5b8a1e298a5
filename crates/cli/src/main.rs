use clap::Parser;
use colored::Colorize;
use tracing::warn;

use passos_smoke::browser::BrowserSession;
use passos_smoke::cli::Cli;
use passos_smoke::logging;
use passos_smoke::report::RunReport;
use passos_smoke::scenario::Scenario;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let format = cli.format;

    let session = match BrowserSession::launch(!cli.headed).await {
        Ok(session) => session,
        Err(err) => {
            eprintln!("{}", format!("Verification failed: {err}").red());
            RunReport::launch_failure(cli.base_url, &err).print(format);
            std::process::exit(1);
        }
    };

    let mut scenario = Scenario::new(cli.base_url, cli.out_dir);
    let outcome = scenario.run(&session, format).await;

    if let Err(err) = session.close().await {
        warn!(target = "smoke", error = %err, "browser close failed");
    }

    let report = scenario.into_report(outcome.as_ref().err());
    report.print(format);

    if outcome.is_err() {
        std::process::exit(1);
    }
}
