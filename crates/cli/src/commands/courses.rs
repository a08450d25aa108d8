use std::path::Path;

use futures::StreamExt;
use registrar_core::config::RegistrarConfig;
use registrar_lms::api::LmsApi;
use registrar_lms::client::LmsClient;
use registrar_lms::models::Course;
use tracing::info;

/// Run the `courses` command: list every course in an account.
pub async fn run(config_path: &str, account_id: Option<&str>) -> anyhow::Result<()> {
    let config = RegistrarConfig::load(Path::new(config_path))?;
    config.validate()?;

    let account_id = account_id
        .map(str::to_string)
        .or_else(|| config.lms.account_id.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("no account id given; pass --account-id or set lms.account_id")
        })?;

    let client =
        LmsClient::new(&config.lms.api_url, &config.lms.api_token).with_per_page(config.lms.per_page);

    info!(account_id = %account_id, "listing account courses");
    let mut pages = client.get_account_courses(&account_id, &[]);

    let mut total = 0usize;
    while let Some(page) = pages.next().await {
        let courses: Vec<Course> = serde_json::from_value(page?)?;
        for course in &courses {
            println!("{:>10}  {:<24}  {}", course.id, course.course_code, course.name);
        }
        total += courses.len();
    }
    println!("{total} courses");

    Ok(())
}
