use feesbook_config::{Catalogs, Config, ConfigManager};
use tempfile::TempDir;

#[test]
fn missing_config_loads_defaults() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();

    let config = manager.load().unwrap();
    assert!(config.catalogs.subjects.is_empty());
    assert!(config.default_operator.is_none());
}

#[test]
fn save_then_load_round_trips_catalogs() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();

    let mut config = Config::default();
    Catalogs::add(&mut config.catalogs.subjects, "Math");
    Catalogs::add(&mut config.catalogs.subjects, "Physics");
    Catalogs::add(&mut config.catalogs.colleges, "City College");
    config.default_operator = Some("A".into());
    manager.save(&config).unwrap();

    let loaded = manager.load().unwrap();
    assert_eq!(loaded.catalogs.subjects, vec!["Math", "Physics"]);
    assert_eq!(loaded.catalogs.colleges, vec!["City College"]);
    assert_eq!(loaded.default_operator.as_deref(), Some("A"));
}

#[test]
fn partial_documents_fill_in_defaults() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
    std::fs::write(manager.config_path(), "{}").unwrap();

    let config = manager.load().unwrap();
    assert!(config.catalogs.branches.is_empty());
    assert!(config.data_root.is_none());
}
