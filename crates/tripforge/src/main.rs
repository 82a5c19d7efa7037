use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tripforge_concur::expense::ExpenseCodes;
use tripforge_concur::settings::SettingsLoader;
use tripforge_concur::store::FileCredentialStore;
use tripforge_concur::{ConcurAuth, RestSubmitter};
use tripforge_engine::config::ConfigLoader;
use tripforge_engine::model::ImportRequest;
use tripforge_engine::orchestrator::ImportRun;
use tripforge_engine::page::Page;
use tripforge_engine::protocol::RunOutcome;
use tripforge_engine::report::ChannelReporter;
use tripforge_engine::submit::{PlanSubmitter, UiSubmitter};
use tripforge_webdriver::WebDriverPage;

#[derive(Parser)]
#[command(name = "tripforge", version, about = "Trip data importer")]
struct Args {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Fill the target site's forms through a WebDriver browser session
    Webdriver {
        /// WebDriver endpoint (chromedriver, geckodriver, ...)
        #[arg(long, default_value = "http://localhost:4444")]
        driver_url: String,

        /// Trip data JSON file
        #[arg(long)]
        input: PathBuf,
    },
    /// Create a travel request and expected expenses via the Concur API
    Concur {
        /// Trip data JSON file
        #[arg(long)]
        input: PathBuf,
    },
    /// Connect to SAP Concur: print the authorization URL, or exchange an
    /// authorization code for tokens
    Auth {
        /// Authorization code from the redirect URL
        #[arg(long)]
        code: Option<String>,
    },
}

fn read_request(path: &PathBuf) -> anyhow::Result<ImportRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading trip data from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing trip data in {}", path.display()))
}

/// Run one import, streaming wire messages to stdout as JSON lines.
async fn run_import(
    submitter: &mut dyn PlanSubmitter,
    request: &ImportRequest,
) -> anyhow::Result<RunOutcome> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Ok(line) = serde_json::to_string(&message) {
                println!("{line}");
            }
        }
    });

    let mut reporter = ChannelReporter::new(tx);
    let outcome = ImportRun::new(submitter, &mut reporter)
        .execute(request)
        .await;

    // Close the channel so the printer drains and exits.
    drop(reporter);
    printer.await?;
    Ok(outcome)
}

fn build_auth(settings: tripforge_concur::settings::ConcurSettings) -> anyhow::Result<ConcurAuth> {
    let store = FileCredentialStore::default_location()
        .context("no home directory for the credential store")?;
    Ok(ConcurAuth::new(settings, Box::new(store)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the JSON message stream.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ConfigLoader::load_default().await?;

    let outcome = match args.mode {
        Mode::Webdriver { driver_url, input } => {
            let request = read_request(&input)?;
            let adapter = config.site_adapter().await?;
            let page = WebDriverPage::new(driver_url);
            let mut submitter = UiSubmitter::new(page, adapter, config.step_options())
                .with_credentials(config.credentials.clone());

            let outcome = run_import(&mut submitter, &request).await?;
            if let Err(e) = submitter.into_page().close().await {
                tracing::warn!("Failed to close WebDriver session: {e}");
            }
            outcome
        }
        Mode::Concur { input } => {
            let request = read_request(&input)?;
            let settings = SettingsLoader::load_default().await?;
            let currency = settings.currency.clone();
            let mut submitter =
                RestSubmitter::new(build_auth(settings)?, ExpenseCodes::default(), currency);
            run_import(&mut submitter, &request).await?
        }
        Mode::Auth { code } => {
            let settings = SettingsLoader::load_default().await?;
            let mut auth = build_auth(settings)?;
            match code {
                Some(code) => {
                    auth.exchange_code(&code).await?;
                    println!("Connected to SAP Concur.");
                }
                None => {
                    println!("Open this URL in a browser, grant access, then re-run");
                    println!("with --code <code from the redirect URL>:");
                    println!("{}", auth.authorize_url()?);
                }
            }
            return Ok(());
        }
    };

    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}
