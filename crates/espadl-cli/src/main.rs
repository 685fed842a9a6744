use espadl_lib::cli::{parse_args, resolve_command, run_download};
use espadl_lib::error::EspaError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), EspaError> {
    color_eyre::install()?;

    let args = parse_args();
    let params = resolve_command(args.command)?;
    run_download(params).await?;

    Ok(())
}
