use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use kmc_core::{InputSelection, SelectedFile};
use kmc_inference::{exporter, Config, InferenceClient};
use tracing::info;

mod duration;
mod logging;
mod presenter;

use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Client for the KMC radiomics inference service", long_about = None)]
pub struct Cli {
    /// Base URL of the prediction service
    #[arg(long, env = "KMC_API_BASE", default_value = kmc_inference::config::DEFAULT_API_BASE)]
    api_base: String,
    /// Model identifier shown when the service does not report one
    #[arg(long)]
    model_hint: Option<String>,
    /// Give up on the request after this long (e.g. 30s, 2m). No limit by default.
    #[arg(long)]
    timeout: Option<HumanDuration>,
    /// Directory where the result is saved as kmc_inferencia_<epoch-ms>.json
    #[arg(long)]
    export_dir: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Predict from a .txt file with the 42 precomputed radiomics features
    Predict {
        #[arg(long)]
        file: PathBuf,
    },
    /// Predict from a T1 NIfTI image and its mask
    PredictNii {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        mask: PathBuf,
    },
    /// Show a previously exported result
    Show { artifact: PathBuf },
}

async fn read_selected(path: &Path) -> anyhow::Result<SelectedFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SelectedFile::new(name, bytes))
}

async fn predict(cli: &Cli, selection: InputSelection) -> anyhow::Result<bool> {
    let config = Config::default()
        .with_api_base(&cli.api_base)?
        .with_model_hint(cli.model_hint.clone())
        .with_timeout(cli.timeout.map(|t| t.0));
    let client = InferenceClient::new(config)?;

    info!("📄 Archivo(s) seleccionado(s): {}", selection.file_names().join(", "));
    // Failures are shown through the state below
    let outcome = client.submit_selection(&selection).await;
    print!("{}", presenter::render_state(&client.state()));

    match (outcome, &cli.export_dir) {
        (Ok(result), Some(dir)) => {
            let artifact = exporter::export(&result);
            let path = artifact.save_in(dir).await?;
            println!("Resultado guardado en {}", path.display());
            Ok(true)
        }
        (Ok(_), None) => Ok(true),
        (Err(_), _) => Ok(false),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let succeeded = match &cli.command {
        Commands::Predict { file } => {
            let file = read_selected(file).await?;
            predict(&cli, InputSelection::feature_file(file)).await?
        }
        Commands::PredictNii { image, mask } => {
            let image = read_selected(image).await?;
            let mask = read_selected(mask).await?;
            predict(&cli, InputSelection::image_mask_pair(image, mask)).await?
        }
        Commands::Show { artifact } => {
            let bytes = tokio::fs::read(artifact)
                .await
                .with_context(|| format!("failed to read {}", artifact.display()))?;
            let result = exporter::import(&bytes)?;
            print!("{}", presenter::render_result(&result));
            true
        }
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
