use std::path::Path;

use futures::{pin_mut, StreamExt};
use registrar_core::config::RegistrarConfig;
use registrar_evals::client::EvalsClient;
use registrar_evals::models::Project;

/// Run the `projects` command: list course-evaluation projects.
pub async fn run(config_path: &str) -> anyhow::Result<()> {
    let config = RegistrarConfig::load(Path::new(config_path))?;
    config.validate()?;

    if !config.evals.enabled {
        anyhow::bail!("course evaluations are not enabled in the configuration");
    }

    let client = EvalsClient::new(&config.evals.api_url, config.evals.api_token.as_deref());
    let pages = client.get_projects(&[]);
    pin_mut!(pages);

    let mut total = 0usize;
    while let Some(page) = pages.next().await {
        let projects: Vec<Project> = serde_json::from_value(page?)?;
        for project in &projects {
            let status = project.status.as_deref().unwrap_or("unknown");
            println!("{:>8}  {:<10}  {}", project.id, status, project.title);
        }
        total += projects.len();
    }
    println!("{total} projects");

    Ok(())
}
