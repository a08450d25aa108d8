use std::path::Path;

use registrar_books::client::BooksClient;
use registrar_core::config::RegistrarConfig;

/// Run the `book` command: look up metadata for one ISBN.
pub async fn run(config_path: &str, isbn: &str) -> anyhow::Result<()> {
    let config = RegistrarConfig::load(Path::new(config_path))?;
    config.validate()?;

    if !config.books.enabled {
        anyhow::bail!("book lookups are not enabled in the configuration");
    }

    let client = BooksClient::new(&config.books);
    let record = client.lookup_isbn(isbn).await?;

    if record.is_empty() {
        println!("No metadata found for ISBN {isbn}");
        return Ok(());
    }

    for (tag, text) in record.iter() {
        println!("{tag}: {text}");
    }
    Ok(())
}
