//! Generate static files

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::generator::Generator;
use crate::{Blog, CONFIG_FILE};

/// Generate the static site
pub fn run(blog: &Blog) -> Result<()> {
    let start = Instant::now();

    let generator = Generator::new(blog)?;
    let report = generator.generate()?;

    tracing::info!(
        "Generated {} pages and copied {} static files in {:.2}s",
        report.pages.len(),
        report.assets,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Watch for file changes and regenerate
///
/// Changes are debounced, so a burst of saves ends in one rebuild that sees
/// the last of them.
pub async fn watch(blog: &Blog) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel::<DebounceEventResult>();

    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for dir in [&blog.posts_dir, &blog.static_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    let config_path = blog.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let mut blog = blog.clone();
    tokio::task::spawn_blocking(move || loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let paths: Vec<PathBuf> = events.into_iter().map(|e| e.path).collect();
                handle_changes(&mut blog, &paths);
            }
            Ok(Err(e)) => tracing::error!("Watch error: {:?}", e),
            Err(_) => break,
        }
    })
    .await?;

    // Keep the debouncer alive until the loop ends
    drop(debouncer);
    Ok(())
}

/// Regenerate after a batch of changed paths, reloading the config if it
/// is among them. Returns whether the site was generated.
fn handle_changes(blog: &mut Blog, paths: &[PathBuf]) -> bool {
    if paths.is_empty() {
        return false;
    }
    for path in paths {
        tracing::info!("File changed: {}", path.display());
    }

    if paths.iter().any(|p| p.ends_with(CONFIG_FILE)) {
        match Blog::new(&blog.base_dir) {
            Ok(reloaded) => *blog = reloaded,
            Err(e) => {
                tracing::error!("Failed to reload {}: {:#}", CONFIG_FILE, e);
                return false;
            }
        }
    }

    tracing::info!("Regenerating...");
    match run(blog) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Generation failed: {:#}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_back_to_back_changes_each_regenerate() {
        let dir = tempfile::tempdir().unwrap();
        let post = dir.path().join("posts/a.md");
        fs::create_dir_all(post.parent().unwrap()).unwrap();
        fs::write(&post, "# First").unwrap();
        let mut blog = Blog::new(dir.path()).unwrap();
        run(&blog).unwrap();

        fs::write(&post, "# Second").unwrap();
        assert!(handle_changes(&mut blog, &[post.clone()]));
        fs::write(&post, "# Third").unwrap();
        assert!(handle_changes(&mut blog, &[post.clone()]));

        let html = fs::read_to_string(blog.public_dir.join("article/a/index.html")).unwrap();
        assert!(html.contains("Third"));
        assert!(!html.contains("Second"));
    }

    #[test]
    fn test_config_change_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("posts")).unwrap();
        fs::write(dir.path().join("posts/a.md"), "# A").unwrap();
        let mut blog = Blog::new(dir.path()).unwrap();

        let config_path = dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "article_dir: notes\n").unwrap();
        assert!(handle_changes(&mut blog, &[config_path]));
        assert_eq!(blog.config.article_dir, "notes");
        assert!(blog.public_dir.join("notes/a/index.html").exists());
    }

    #[test]
    fn test_no_changes_no_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let mut blog = Blog::new(dir.path()).unwrap();
        assert!(!handle_changes(&mut blog, &[]));
        assert!(!blog.public_dir.exists());
    }
}
