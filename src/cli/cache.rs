//! `draftmeta cache` - inspect and clear on-disk caches

use crate::analysis::TrophyCacheStore;
use crate::cache::{get_responses_dir, CacheCoordinator, ResponseCache};
use crate::config::AnalyzerConfig;
use anyhow::Result;
use console::style;

fn response_cache(config: &AnalyzerConfig) -> ResponseCache {
    ResponseCache::new(
        get_responses_dir(&config.cache.dir()),
        config.cache.ttl_hours,
    )
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

pub(super) fn stats(config: &AnalyzerConfig) -> Result<()> {
    let cache = response_cache(config);
    let stats = cache.stats();

    println!("\n{}", style("Cache").bold());
    println!("  Location:  {}", cache.dir().display());
    println!("  Entries:   {}", stats.entries);
    println!(
        "  Valid:     {}",
        style(stats.entries - stats.expired).green()
    );
    println!("  Expired:   {}", style(stats.expired).yellow());
    println!("  Size:      {:.2} MB", megabytes(stats.total_bytes));
    println!("  TTL:       {}h", config.cache.ttl_hours);
    Ok(())
}

pub(super) fn clear(config: &AnalyzerConfig) -> Result<()> {
    let mut coordinator = CacheCoordinator::new();
    coordinator.register(Box::new(response_cache(config)));
    coordinator.register(Box::new(TrophyCacheStore::new(
        config.cache.dir(),
        config.trophy.max_age_days,
    )));

    let dropped = coordinator.invalidate_all();
    for (layer, count) in &dropped {
        println!("  {:<10} {}", layer, count);
    }
    let total: usize = dropped.iter().map(|(_, n)| n).sum();
    println!("{}Cleared {} cache entries", style("✓ ").green(), total);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clear_empties_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AnalyzerConfig::default();
        config.cache.dir = Some(dir.path().to_path_buf());

        let cache = response_cache(&config);
        cache.set(&["card_ratings", "FDN"], &json!([1, 2])).unwrap();
        assert_eq!(cache.stats().entries, 1);

        clear(&config).unwrap();
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_megabytes() {
        assert!((megabytes(1024 * 1024) - 1.0).abs() < 1e-9);
    }
}
