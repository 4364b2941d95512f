//! Startup: open the storage backend and load seed products.

use std::sync::Arc;

use catalog_core::ServiceConfig;
use catalog_kv::{FileLoader, KVStore, MemoryKV, RedbStore};
use catalog_store::PRODUCT_PREFIX;
use tracing::info;

/// Open the configured backend: an in-memory map, or a redb file.
pub fn open_store(config: &ServiceConfig, in_memory: bool) -> anyhow::Result<Arc<dyn KVStore>> {
    if in_memory {
        info!("Using in-memory product store");
        return Ok(Arc::new(MemoryKV::new()));
    }

    let db_path = config.resolve_db_path();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    info!("Opening product store at {}", db_path.display());
    let store = RedbStore::open(&db_path)
        .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?;
    Ok(Arc::new(store))
}

/// Load seed products if a seed directory is configured.
/// Returns the number of products written.
pub fn seed(config: &ServiceConfig, kv: &dyn KVStore) -> anyhow::Result<usize> {
    let Some(dir) = &config.seed_dir else {
        return Ok(0);
    };
    let loaded = FileLoader::load(dir, PRODUCT_PREFIX, kv)
        .map_err(|e| anyhow::anyhow!("failed to load seed products: {}", e))?;
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_store::product_key;

    #[test]
    fn test_open_redb_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig {
            data_dir: Some(dir.path().join("nested")),
            ..Default::default()
        };
        let kv = open_store(&config, false).unwrap();
        kv.set("k", b"v").unwrap();
        assert!(dir.path().join("nested/catalog.redb").is_file());
    }

    #[test]
    fn test_seed_loads_products() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("products.json"),
            r#"[{"id": "1", "title": "Blue Widget"}, {"id": "2", "title": "Red Gadget"}]"#,
        )
        .unwrap();
        let config = ServiceConfig {
            seed_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        let kv = open_store(&config, true).unwrap();
        assert_eq!(seed(&config, kv.as_ref()).unwrap(), 2);
        assert!(kv.get(&product_key("2")).unwrap().is_some());
    }

    #[test]
    fn test_no_seed_dir() {
        let config = ServiceConfig::default();
        let kv = open_store(&config, true).unwrap();
        assert_eq!(seed(&config, kv.as_ref()).unwrap(), 0);
    }
}
