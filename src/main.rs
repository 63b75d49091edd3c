use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use watsonx_demo::app::App;
use watsonx_demo::config::{credentials_from_env, Config, EnvSource};

#[derive(Debug, Parser)]
#[command(name = "watsonx-demo")]
#[command(about = "Run text generation demos against watsonx.ai")]
struct CliArgs {
    /// Env file holding WATSONX_API_KEY and WATSONX_PROJECT_ID (defaults to ./.env).
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// watsonx.ai service URL, e.g. https://eu-de.ml.cloud.ibm.com
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Retries for timeouts and connection failures.
    #[arg(long, value_name = "N")]
    max_retries: Option<usize>,
}

impl CliArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.service_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = self.max_retries {
            config.max_retries = retries;
        }
    }
}

async fn run(args: &CliArgs) -> watsonx_demo::Result<()> {
    let env = EnvSource::load(args.env_file.as_deref())?;
    let credentials = credentials_from_env(&env)?;

    let mut config = Config::from_env(&env)?;
    args.apply(&mut config);

    let app = App::new(&config, credentials);
    let stdout = std::io::stdout();
    app.run(&mut stdout.lock()).await
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "watsonx_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting watsonx-demo");

    let args = CliArgs::parse();

    match run(&args).await {
        Ok(()) => {
            info!("Demo completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Demo failed: {}", e);
            std::process::exit(1);
        }
    }
}
