use nh_core::{Category, Country};
use nh_storage::{create_store, PersistentPreferences};
use std::sync::Arc;
use tempfile::tempdir;
use tokio_test::{assert_err, assert_ok};

#[test]
fn test_selection_survives_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    {
        let store = assert_ok!(create_store("file", Some(&path)));
        let prefs = PersistentPreferences::new(store);
        prefs.set_active_category(Category::Business);
        prefs.set_category_name("Kinh doanh");
        prefs.set_selected_country(Country::Gb);
    }

    let store = assert_ok!(create_store("file", Some(&path)));
    let prefs = PersistentPreferences::new(Arc::clone(&store));
    assert_eq!(prefs.active_category(), Some(Category::Business));
    assert_eq!(prefs.category_name().as_deref(), Some("Kinh doanh"));
    assert_eq!(prefs.selected_country(), Some(Country::Gb));
    assert!(!prefs.is_degraded());
}

#[test]
fn test_factory_rejects_bad_config() {
    assert_err!(create_store("file", None));
    assert_err!(create_store("redis", None));
    assert_ok!(create_store("memory", None));
}
