// src/seeds.rs
// =============================================================================
// Collects the seed URLs for one run of the program.
//
// Seeds can come from:
// - positional arguments:   site-harvester crawl https://a.test https://b.test
// - a file, one per line:   --seeds seeds.txt
// - stdin, one per line:    --seeds -   (e.g. piped from a queue consumer)
//
// Blank lines and lines starting with '#' are ignored. Order is kept and
// repeated seeds are dropped. Seeds are not validated here; an invalid seed
// is reported by the crawler and simply produces an empty crawl.
// =============================================================================

use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::AsyncReadExt;

// Merges argument seeds with seeds read from `seeds_file` ("-" = stdin)
pub async fn collect_seeds(args: &[String], seeds_file: Option<&Path>) -> Result<Vec<String>> {
    let mut seeds = Vec::new();
    for seed in args {
        push_unique(&mut seeds, seed.trim());
    }

    if let Some(path) = seeds_file {
        let text = read_seed_source(path).await?;
        for seed in parse_seed_lines(&text) {
            push_unique(&mut seeds, &seed);
        }
    }

    Ok(seeds)
}

// One seed per non-empty, non-comment line
pub fn parse_seed_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

async fn read_seed_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read seeds from stdin")?;
        return Ok(text);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read seed file {}", path.display()))
}

fn push_unique(seeds: &mut Vec<String>, seed: &str) {
    if !seed.is_empty() && !seeds.iter().any(|s| s == seed) {
        seeds.push(seed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_seed_lines() {
        let text = "https://a.test\n\n  # comment\n  https://b.test  \n";
        assert_eq!(parse_seed_lines(text), vec!["https://a.test", "https://b.test"]);
    }

    #[tokio::test]
    async fn test_collect_merges_args_and_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "https://b.test\nhttps://a.test\nhttps://c.test\n").unwrap();

        let args = vec!["https://a.test".to_string(), " https://b.test ".to_string()];
        let seeds = collect_seeds(&args, Some(file.path())).await.unwrap();
        assert_eq!(seeds, vec!["https://a.test", "https://b.test", "https://c.test"]);
    }

    #[tokio::test]
    async fn test_missing_seed_file() {
        let result = collect_seeds(&[], Some(Path::new("/no/such/seeds.txt"))).await;
        assert!(result.is_err());
    }
}
