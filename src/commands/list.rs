//! List blog posts

use anyhow::Result;

use crate::Known;

/// Print every listed post, CMS entries first
pub fn run(known: &Known) -> Result<()> {
    let posts = known.resolver().get_posts()?;

    println!("Posts ({}):", posts.len());
    for post in posts {
        let date = post
            .parse_published_on()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .or_else(|| post.published_on.clone())
            .unwrap_or_else(|| "----------".to_string());
        println!(
            "  {} - {} [{}]",
            date,
            post.title_or_default(),
            post.slug.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
