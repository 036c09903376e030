//! List posts

use anyhow::Result;

use crate::content::PostStore;
use crate::pages::{load_summaries, Summary};
use crate::Blog;

/// Print a summary line per post, in loader order
pub fn run(blog: &Blog) -> Result<()> {
    let store = PostStore::new(&blog.posts_dir);
    let summaries = load_summaries(&store, &blog.config)?;

    println!("Posts ({}):", summaries.len());
    for summary in &summaries {
        println!("  {}", format_line(summary));
    }

    Ok(())
}

fn format_line(summary: &Summary) -> String {
    format!(
        "{} - {} [{}]",
        summary.date.as_deref().unwrap_or("----------"),
        summary.title.as_deref().unwrap_or(&summary.slug),
        summary.href
    )
}
