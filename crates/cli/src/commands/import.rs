use std::path::Path;
use std::time::{Duration, Instant};

use registrar_core::config::RegistrarConfig;
use registrar_lms::client::LmsClient;
use registrar_lms::import::SisImporter;
use tracing::info;

/// Run the `import` command: upload one SIS CSV and wait for the job to
/// finish. Exits non-zero when the import recorded processing errors.
pub async fn run(
    config_path: &str,
    csv_path: &str,
    account_id: Option<&str>,
    dryrun: bool,
    timeout_seconds: u64,
) -> anyhow::Result<()> {
    let config = RegistrarConfig::load(Path::new(config_path))?;
    config.validate()?;

    info!("Loaded configuration from {}", config_path);

    let account_id = account_id
        .map(str::to_string)
        .or_else(|| config.lms.account_id.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("no account id given; pass --account-id or set lms.account_id")
        })?;

    let timeout = if timeout_seconds == 0 {
        None
    } else {
        Some(Duration::from_secs(timeout_seconds))
    };

    let client =
        LmsClient::new(&config.lms.api_url, &config.lms.api_token).with_per_page(config.lms.per_page);
    let mut importer = SisImporter::new(client, &account_id)
        .with_dryrun(dryrun)
        .with_timeout(timeout);

    println!("Importing SIS CSV: {csv_path}");
    let start = Instant::now();
    let result = importer.import_csv(Path::new(csv_path)).await?;

    match result {
        Some(status) => {
            println!(
                "Import completed in {:.1}s",
                start.elapsed().as_secs_f64()
            );
            println!("  State:    {}", status.workflow_state());
            println!("  Progress: {}%", status.progress());
            let warnings = importer.warnings().get(csv_path).map_or(0, Vec::len);
            let errors = importer.errors().get(csv_path).map_or(0, Vec::len);
            println!("  Warnings: {warnings}");
            println!("  Errors:   {errors}");
        }
        None => {
            println!("Dry run mode - nothing was uploaded to the LMS.");
        }
    }

    importer.check_errors(true)?;
    Ok(())
}
