use crate::cli::DownloadParams;
use crate::download::{HttpItemSource, ItemSource};
use crate::error::EspaError;
use crate::inventory::LocalInventory;
use crate::orchestrator::{Orchestrator, Summary};
use crate::service::{EspaClient, OrderSelector, OrderService};
use tracing;

pub async fn run_download(params: DownloadParams) -> Result<Summary, EspaError> {
    let DownloadParams {
        host,
        email,
        selector,
        target_directory,
        credentials,
        verify_checksums,
        timeout,
    } = params;

    tracing::info!(
        host = %host,
        email = %email,
        order = %selector,
        target = %target_directory.display(),
        checksum = verify_checksums,
        "Starting download"
    );

    let client = EspaClient::new(&host, email, credentials, timeout)?;
    let mut orchestrator = Orchestrator::new(
        client,
        HttpItemSource::new(),
        LocalInventory::new(target_directory),
        verify_checksums,
    );

    execute(&mut orchestrator, &selector).await
}

/// Runs the orchestrator, logs the summary and turns any recorded failure into an error.
pub async fn execute<S: OrderService, T: ItemSource>(
    orchestrator: &mut Orchestrator<S, T>,
    selector: &OrderSelector,
) -> Result<Summary, EspaError> {
    let summary = orchestrator.run(selector).await?;
    summary.log();

    if summary.has_failures() {
        return Err(EspaError::IncompleteRun {
            failed: summary.failure_count(),
            total: summary.total(),
        });
    }

    tracing::info!("Download completed successfully");
    Ok(summary)
}
