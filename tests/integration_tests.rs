//! Integration tests for the campaign translation store
//!
//! These tests drive the store end to end: documents served over HTTP by a
//! mock server or read from a temporary directory, preferences persisted to
//! a temporary file, and content resynced through bindings.

use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use campaign_i18n::i18n::{
    resolve, ChangeOutcome, ContentBindings, FilePreferenceStore, FileSource, HttpSource,
    LanguageRegistry, Params, PreferenceStore, StoreSettings, TranslationError, TranslationStore,
    TranslationTable,
};
use campaign_i18n::retry::RetryConfig;

// ==================== Test Helpers ====================

fn document(title: &str, collected: &str) -> serde_json::Value {
    serde_json::json!({
        "hero": {"title": title, "subtitle": "DMD"},
        "donation": {"collected": collected, "goal": "₺5.000.000"},
        "buttons": {"donate": "Donate", "copyIban": "Copy IBAN"},
        "contact": {"phone": "+90"},
        "copyright": "© 2024"
    })
}

async fn mount_language(server: &MockServer, code: &str, body: serde_json::Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/lang/{}.json", code)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

fn http_store(server: &MockServer, preferences: Arc<dyn PreferenceStore>) -> TranslationStore {
    let source = HttpSource::new(reqwest::Client::new(), &format!("{}/lang", server.uri()))
        .with_retry(RetryConfig::new(2, Duration::from_millis(5)));
    TranslationStore::create(
        StoreSettings::default(),
        LanguageRegistry::campaign_defaults(),
        Arc::new(source),
        preferences,
        None,
    )
}

// ==================== HTTP Flow Tests ====================

#[tokio::test]
async fn test_full_language_switch_over_http() {
    let server = MockServer::start().await;
    mount_language(&server, "tr", document("Furkan için Umut", "{{amount}} toplandı"), 1).await;
    mount_language(&server, "de", document("Hoffnung für Furkan", "{{amount}} gesammelt"), 1).await;

    let dir = TempDir::new().unwrap();
    let prefs_path = dir.path().join("prefs.json");
    let store = http_store(&server, Arc::new(FilePreferenceStore::new(&prefs_path)));

    store.initialize().await.expect("Initial load should succeed");
    assert_eq!(store.resolve("hero.title", None), "Furkan için Umut");

    let outcome = store.set_active_language("de").await.expect("Switch should succeed");
    assert!(matches!(outcome, ChangeOutcome::Changed(_)));

    let params: Params = [("amount".to_string(), "₺1.250.000".to_string())]
        .into_iter()
        .collect();
    assert_eq!(store.resolve("donation.collected", Some(&params)), "₺1.250.000 gesammelt");
    assert_eq!(store.resolve("donation.missing", Some(&params)), "donation.missing");

    // A new store picks the persisted preference up
    let restarted = http_store(&server, Arc::new(FilePreferenceStore::new(&prefs_path)));
    assert_eq!(restarted.active_language(), "de");
}

#[tokio::test]
async fn test_missing_language_file_falls_back_to_default() {
    let server = MockServer::start().await;
    mount_language(&server, "tr", document("Furkan için Umut", "x"), 1).await;
    Mock::given(method("GET"))
        .and(path("/lang/en.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = http_store(&server, Arc::new(FilePreferenceStore::new(dir.path().join("prefs.json"))));

    let table = store.load("en").await.expect("Should degrade to Turkish");

    assert_eq!(table.get("hero.title"), Some("Furkan için Umut"));
    assert_eq!(store.metrics().fallbacks, 1);
}

#[tokio::test]
async fn test_explicit_switch_to_broken_language_is_reported() {
    let server = MockServer::start().await;
    mount_language(&server, "tr", document("Furkan için Umut", "x"), 1).await;
    Mock::given(method("GET"))
        .and(path("/lang/en.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let prefs = Arc::new(FilePreferenceStore::new(dir.path().join("prefs.json")));
    let store = http_store(&server, prefs.clone());
    store.initialize().await.unwrap();

    let err = store.set_active_language("en").await.unwrap_err();

    assert!(matches!(err, TranslationError::TranslationLoadFailed { .. }));
    assert_eq!(store.active_language(), "tr");
    assert_eq!(prefs.load(), None);
    assert_eq!(store.resolve("hero.title", None), "Furkan için Umut");
}

#[tokio::test]
async fn test_clear_cache_refetches_over_http() {
    let server = MockServer::start().await;
    mount_language(&server, "en", document("Hope for Furkan", "x"), 2).await;

    let dir = TempDir::new().unwrap();
    let store = http_store(&server, Arc::new(FilePreferenceStore::new(dir.path().join("prefs.json"))));

    store.load("en").await.unwrap();
    store.load("en").await.unwrap();
    store.clear_cache();
    store.load("en").await.unwrap();

    // wiremock verifies exactly two requests when the server drops
    assert_eq!(store.metrics().fetches, 2);
}

#[tokio::test]
async fn test_concurrent_loads_issue_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lang/de.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(document("Hoffnung für Furkan", "x"))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = http_store(&server, Arc::new(FilePreferenceStore::new(dir.path().join("prefs.json"))));

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.load("de").await })
        })
        .collect();

    let mut tables = Vec::new();
    for handle in handles {
        tables.push(handle.await.unwrap().expect("Should succeed"));
    }

    assert!(tables.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    assert_eq!(store.metrics().fetches, 1);
}

// ==================== File Source & Bindings Tests ====================

#[tokio::test]
async fn test_bindings_resync_on_language_change() {
    let dir = TempDir::new().unwrap();
    for (code, title) in [("tr", "Furkan için Umut"), ("en", "Hope for Furkan")] {
        std::fs::write(
            dir.path().join(format!("{}.json", code)),
            document(title, "x").to_string(),
        )
        .unwrap();
    }

    let store = TranslationStore::create(
        StoreSettings::default(),
        LanguageRegistry::campaign_defaults(),
        Arc::new(FileSource::new(dir.path())),
        Arc::new(FilePreferenceStore::new(dir.path().join("prefs.json"))),
        Some("tr-TR"),
    );

    let title = Arc::new(Mutex::new(String::new()));
    let button = Arc::new(Mutex::new(String::new()));
    let mut bindings = ContentBindings::new();
    {
        let title = title.clone();
        let button = button.clone();
        bindings
            .bind("hero.title", move |text| *title.lock().unwrap() = text.to_string())
            .bind("buttons.copyIban", move |text| *button.lock().unwrap() = text.to_string());
    }
    store.subscribe(bindings.into_observer());

    store.initialize().await.unwrap();
    assert_eq!(*title.lock().unwrap(), "Furkan için Umut");

    store.set_active_language("en").await.unwrap();
    assert_eq!(*title.lock().unwrap(), "Hope for Furkan");
    assert_eq!(*button.lock().unwrap(), "Copy IBAN");
}

#[tokio::test]
async fn test_unsupported_language_never_touches_source() {
    let dir = TempDir::new().unwrap();
    let store = TranslationStore::create(
        StoreSettings::default(),
        LanguageRegistry::campaign_defaults(),
        Arc::new(FileSource::new(dir.path())),
        Arc::new(FilePreferenceStore::new(dir.path().join("prefs.json"))),
        None,
    );

    assert!(matches!(
        store.load("fr").await,
        Err(TranslationError::UnsupportedLanguage(_))
    ));
    assert!(matches!(
        store.set_active_language("fr").await,
        Err(TranslationError::UnsupportedLanguage(_))
    ));
    assert_eq!(store.metrics().fetches, 0);
    assert!(!dir.path().join("prefs.json").exists());
}

// ==================== Property Tests ====================

fn flat_table(entries: &[(String, String)]) -> TranslationTable {
    let map: serde_json::Map<String, serde_json::Value> = entries
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect();
    TranslationTable::from_value(serde_json::Value::Object(map)).unwrap()
}

proptest! {
    #[test]
    fn prop_missing_key_resolves_to_itself(key in "[a-z]{1,8}(\\.[a-z]{1,8}){0,3}") {
        let table = flat_table(&[("ZZ".to_string(), "never".to_string())]);
        prop_assert_eq!(resolve(&table, &key, None), key);
    }

    #[test]
    fn prop_text_without_placeholders_is_unchanged(
        text in "[^{}]{0,40}",
        value in "[a-zA-Z0-9 ]{0,10}",
    ) {
        let table = flat_table(&[("msg".to_string(), text.clone())]);
        let params: Params = [("name".to_string(), value)].into_iter().collect();
        prop_assert_eq!(resolve(&table, "msg", Some(&params)), text);
    }

    #[test]
    fn prop_placeholder_is_replaced(value in "[a-zA-Z0-9 ]{0,10}") {
        let table = flat_table(&[("greet".to_string(), "Hi {{name}}".to_string())]);
        let params: Params = [("name".to_string(), value.clone())].into_iter().collect();
        prop_assert_eq!(resolve(&table, "greet", Some(&params)), format!("Hi {}", value));
    }
}
