use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lambda_runtime::{service_fn, LambdaEvent};
use tracing::info;

use fft_pipeline::analysis::{generate_fft_plot, FigureOptions};
use fft_pipeline::config::{DispatchConfig, StorageConfig};
use fft_pipeline::dispatcher::{Dispatcher, EcsLauncher, S3Notification};
use fft_pipeline::keys::DEFAULT_INPUT_PREFIX;
use fft_pipeline::storage::S3Store;
use fft_pipeline::types::ObjectRef;
use fft_pipeline::uploader::upload_file_with_timestamp;
use fft_pipeline::utils::init_logger;

#[derive(Parser)]
#[command(name = "fft-pipeline")]
#[command(version)]
#[command(about = "Upload images, dispatch analyzer tasks and plot image spectra", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image to S3 with a timestamp in its name
    Upload {
        /// Path to the local image file
        local_image_path: PathBuf,

        /// Name of the S3 bucket
        bucket_name: String,

        /// Key prefix for uploaded images
        #[arg(long, default_value = DEFAULT_INPUT_PREFIX)]
        prefix: String,
    },

    /// Handle S3 upload notifications as a Lambda function
    Dispatch,

    /// Generate the FFT plot for an image stored in S3
    Analyze {
        /// Name of the S3 bucket
        #[arg(env = "INPUT_BUCKET")]
        bucket: String,

        /// Key of the input image file
        #[arg(env = "INPUT_KEY")]
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let cli = Cli::parse();
    match cli.command {
        Commands::Upload {
            local_image_path,
            bucket_name,
            prefix,
        } => {
            let store = S3Store::new(&StorageConfig::from_env())?;
            upload_file_with_timestamp(&store, &local_image_path, &bucket_name, &prefix).await?;
        }
        Commands::Dispatch => {
            let config = DispatchConfig::from_env()?;
            info!("Dispatching to cluster {} ({})", config.cluster, config.task_definition);
            let dispatcher = Dispatcher::new(EcsLauncher::from_env(config).await);
            lambda_runtime::run(service_fn(|event: LambdaEvent<S3Notification>| {
                dispatcher.handle(event)
            }))
            .await
            .map_err(|e| anyhow::anyhow!("Lambda runtime error: {}", e))?;
        }
        Commands::Analyze { bucket, key } => {
            let store = S3Store::new(&StorageConfig::from_env())?;
            generate_fft_plot(&store, &ObjectRef::new(bucket, key), &FigureOptions::default())
                .await?;
        }
    }

    Ok(())
}
