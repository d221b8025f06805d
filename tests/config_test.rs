//! Configuration loading tests
//!
//! Files are written to a temporary directory; tests touching the process
//! environment run serially.

use std::fs;
use serial_test::serial;
use guestlist::config::Settings;
use guestlist::GuestListError;

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::from_file(dir.path().join("absent").to_str().unwrap()).unwrap();

    assert_eq!(settings.lifecycle.retention_days, 15);
    assert_eq!(settings.lifecycle.purge_days, 30);
    assert_eq!(settings.lifecycle.recently_cancelled_hours, 48);
    assert_eq!(settings.tokens.check_in_prefix, "GL-");
    assert!(settings.validate().is_ok());
}

#[test]
#[serial]
fn test_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[lifecycle]
retention_days = 7
timezone = "Asia/Kolkata"

[sms]
default_country_code = "44"
"#,
    )
    .unwrap();

    let settings = Settings::from_file(path.to_str().unwrap()).unwrap();

    assert_eq!(settings.lifecycle.retention_days, 7);
    assert_eq!(settings.lifecycle.purge_days, 30);
    assert_eq!(settings.lifecycle.tz(), chrono_tz::Asia::Kolkata);
    assert_eq!(settings.sms.default_country_code, "44");
    assert_eq!(settings.database.max_connections, 10);
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut defaults = Settings::default();
    defaults.lifecycle.purge_days = 60;
    fs::write(&path, toml::to_string(&defaults).unwrap()).unwrap();

    std::env::set_var("GUESTLIST_LIFECYCLE__PURGE_DAYS", "45");
    let loaded = Settings::from_file(path.to_str().unwrap());
    std::env::remove_var("GUESTLIST_LIFECYCLE__PURGE_DAYS");

    assert_eq!(loaded.unwrap().lifecycle.purge_days, 45);
}

#[test]
fn test_validation_rejects_bad_values() {
    let mut settings = Settings::default();
    settings.lifecycle.timezone = "Mars/Olympus_Mons".to_string();
    assert!(matches!(settings.validate(), Err(GuestListError::Config(_))));

    let mut settings = Settings::default();
    settings.tokens.check_in_alphabet = "abcdefghijklmnopq".to_string();
    assert!(matches!(settings.validate(), Err(GuestListError::Config(_))));

    let mut settings = Settings::default();
    settings.lifecycle.retention_days = 0;
    assert!(matches!(settings.validate(), Err(GuestListError::Config(_))));

    let mut settings = Settings::default();
    settings.logging.level = "loud".to_string();
    assert!(matches!(settings.validate(), Err(GuestListError::Config(_))));
}
