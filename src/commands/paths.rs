//! Print the pre-rendered paths

use anyhow::Result;

use crate::Known;

/// Print the enumerated slugs and fallback policy as JSON
pub fn run(known: &Known) -> Result<()> {
    let paths = known.resolver().get_static_paths()?;
    println!("{}", serde_json::to_string_pretty(&paths)?);
    Ok(())
}
