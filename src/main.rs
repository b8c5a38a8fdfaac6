//! Licitación ranking batch job — binary entrypoint.
//! One invocation = one full pipeline run: fetch, filter, score, rank,
//! publish. Exits non-zero on configuration or store failure.

use licita_ranker::pipeline::{self, RunOptions};
use licita_ranker::settings::Settings;
use licita_ranker::sources::mercado_publico::MercadoPublicoSource;
use licita_ranker::sources::sicep::SicepSheetSource;
use licita_ranker::sources::{feed_periods, TenderSource};
use licita_ranker::{publish, store};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

async fn run() -> anyhow::Result<()> {
    // Load .env in local runs; no-op when absent.
    let _ = dotenvy::dotenv();

    let settings = Settings::load_default()?;
    let credentials = Settings::credentials_json()?;

    let sheets = store::google::connect(settings.spreadsheet_id.clone(), &credentials).await?;

    let today = chrono::Local::now().date_naive();
    let mut sources: Vec<Box<dyn TenderSource + '_>> = Vec::new();
    for (year, month) in feed_periods(today) {
        sources.push(Box::new(MercadoPublicoSource::new(
            settings.feed_base_url.clone(),
            year,
            month,
        )));
    }
    sources.push(Box::new(SicepSheetSource::new(
        &sheets,
        publish::tabs::SICEP_MIRROR,
    )));

    let options = RunOptions {
        top_n: settings.top_n,
        tracked_code: settings.tracked_code.clone(),
    };
    let summary = pipeline::run(&sheets, &sources, &options).await?;
    tracing::info!(?summary, "batch run finished");
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(e) = run().await {
        tracing::error!(error = ?e, "run failed");
        std::process::exit(1);
    }
}
