/*!
 * Tests for configuration loading and saving
 */

use locflow::app_config::{Config, LogLevel};
use locflow::resource::MismatchPolicy;
use crate::common;

#[test]
fn test_saveThenLoad_shouldKeepEverySetting() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let mut config = Config::default();
    config.target_locale = "de-DE".to_string();
    config.output_encoding = Some("windows-1252".to_string());
    config.line_break = Some("\r\n".to_string());
    config.log_level = LogLevel::Debug;
    config.writer.referent_copies = 2;
    config.segmentation.mismatch_policy = MismatchPolicy::UseSource;
    config.pseudo.expand_ratio = 0.5;
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded, config);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_fromFile_emptyObject_shouldUseDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", b"{}").unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.source_locale_id().unwrap().as_str(), "en");
    assert_eq!(config.target_locale_id().unwrap().as_str(), "fr");
    assert_eq!(config.segmentation.mismatch_policy, MismatchPolicy::AppendSource);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_fromFile_invalidJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", b"{ not json").unwrap();
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_fromFile_missingFile_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    assert!(Config::from_file(dir.path().join("missing.json")).is_err());
}

#[test]
fn test_validate_badLineBreak_shouldFail() {
    let mut config = Config::default();
    config.line_break = Some("\n\n".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_expandRatioOutOfRange_shouldFail() {
    let mut config = Config::default();
    config.pseudo.expand_ratio = 2.5;
    assert!(config.validate().is_err());
}
