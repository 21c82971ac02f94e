//! photobook - command-line front end.
//!
//! This binary is the composition root: it builds the services from the
//! configuration and runs one subcommand.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use photobook::{
    config::{Cli, Command, Config, SearchArgs},
    transport::TRANSPORT_CACHE_DIR,
    CachingTransport, FilePreferences, HttpTransport, ImageCache, ImageStore, NetworkError,
    PhotoService, ResponseCache, SavedIndex, StoredImageKey,
};

type Service = PhotoService<HttpTransport, CachingTransport<HttpTransport>>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.config.verbose);

    if let Err(e) = cli.config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let Some(data_dir) = cli.config.resolved_data_dir() else {
        error!("Configuration error: no data directory");
        return ExitCode::FAILURE;
    };

    let index = SavedIndex::new(Arc::new(FilePreferences::in_data_dir(&data_dir)));
    index.ensure_created();

    match cli.command {
        Command::Search(args) => run_search(&cli.config, &data_dir, args).await,
        Command::Save { url } => run_save(&cli.config, &data_dir, index, &url).await,
        Command::Saved => run_saved(&data_dir, index),
        Command::Remove { key } => run_remove(&data_dir, index, key),
        Command::Clear => run_clear(&data_dir, index),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "photobook=debug"
    } else {
        "photobook=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build the photo service from validated configuration.
fn build_service(config: &Config, data_dir: &Path) -> Result<Service, String> {
    config.validate_remote().map_err(|e| e.to_string())?;
    let base = config.api_base_url().map_err(|e| e.to_string())?;

    let api = HttpTransport::api().map_err(|e| e.to_string())?;
    let images = CachingTransport::new(
        HttpTransport::images(config.image_timeouts()).map_err(|e| e.to_string())?,
        ResponseCache::with_disk(
            config.transport_cache_bytes,
            data_dir.join(TRANSPORT_CACHE_DIR),
            config.transport_cache_bytes,
        ),
    );
    let cache =
        ImageCache::with_capacity_and_entries(config.image_cache_bytes, config.image_cache_entries);

    Ok(PhotoService::with_cache(
        api,
        images,
        base,
        config.access_key.clone(),
        cache,
    ))
}

// =============================================================================
// Commands
// =============================================================================

async fn run_search(config: &Config, data_dir: &Path, args: SearchArgs) -> ExitCode {
    let service = match build_service(config, data_dir) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let per_page = args.per_page.unwrap_or(config.page_size);
    let handle = service.spawn_search(args.query.clone(), args.page, per_page);
    let abort = handle.abort_handle();

    let outcome = tokio::select! {
        outcome = handle.join() => outcome,
        _ = tokio::signal::ctrl_c() => {
            abort.abort();
            warn!("Interrupted, search cancelled");
            return ExitCode::FAILURE;
        }
    };

    match outcome {
        Some(Ok(photos)) => {
            if photos.is_empty() {
                println!("(no results for '{}')", args.query);
            }
            for photo in &photos {
                println!(
                    "{}x{}\t{} likes\t{}\t{}",
                    photo.width, photo.height, photo.likes, photo.user.name, photo.urls.regular
                );
            }
            ExitCode::SUCCESS
        }
        Some(Err(e)) => {
            report_network_error("Search", &e);
            ExitCode::FAILURE
        }
        None => ExitCode::FAILURE,
    }
}

async fn run_save(config: &Config, data_dir: &Path, index: SavedIndex, url: &str) -> ExitCode {
    let service = match build_service(config, data_dir) {
        Ok(service) => service,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let image = match service.fetch_image(url).await {
        Ok(image) => image,
        Err(e) => {
            report_network_error("Download", &e);
            return ExitCode::FAILURE;
        }
    };

    let store = ImageStore::in_data_dir(data_dir, index.clone());
    match store.save(&image) {
        Some(key) => {
            index.add(key.clone());
            info!(key = %key, "Photo saved");
            println!("{}", key);
            ExitCode::SUCCESS
        }
        None => {
            error!("Photo could not be stored");
            ExitCode::FAILURE
        }
    }
}

fn run_saved(data_dir: &Path, index: SavedIndex) -> ExitCode {
    let store = ImageStore::in_data_dir(data_dir, index.clone());
    let keys = index.get().unwrap_or_default();

    // Fetching repairs the index as a side effect
    for key in &keys {
        if let Some(image) = store.fetch(std::slice::from_ref(key)).pop() {
            println!("{}\t{}x{}", key, image.width(), image.height());
        }
    }

    let remaining = index.get().unwrap_or_default();
    if remaining.len() < keys.len() {
        warn!(
            dropped = keys.len() - remaining.len(),
            "Removed saved entries with missing files"
        );
    }

    ExitCode::SUCCESS
}

fn run_remove(data_dir: &Path, index: SavedIndex, key: String) -> ExitCode {
    let key = StoredImageKey::from(key);
    let store = ImageStore::in_data_dir(data_dir, index.clone());

    store.delete(&key);
    index.remove(&key);
    ExitCode::SUCCESS
}

fn run_clear(data_dir: &Path, index: SavedIndex) -> ExitCode {
    let store = ImageStore::in_data_dir(data_dir, index.clone());
    let keys = store.replace_all(&[]);
    index.replace(keys);
    info!("All saved photos removed");
    ExitCode::SUCCESS
}

fn report_network_error(action: &str, err: &NetworkError) {
    match err {
        NetworkError::InvalidUrl => {
            error!("{} failed: request rejected (check the access key and URL)", action)
        }
        other => error!("{} failed: {}", action, other),
    }
}
