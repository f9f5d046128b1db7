// ==========================================
// 配置覆写 集成测试
// ==========================================
// 测试目标: config_kv 覆写值经 ConfigManager 流入编排器
// ==========================================


use procurement_risk::config::{config_keys, ConfigManager};
use procurement_risk::{ApiError, FeedMode, RiskApi};
use test_helpers::*;

#[tokio::test]
async fn test_threshold_and_locale_overrides_reach_analysis() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let supplier_id = SupplierBuilder::new("Delta Forge", "India").insert(&db_path);
    insert_schedule_mix(&db_path, supplier_id, &[6, 12], 2, 1_000.0);

    let manager = ConfigManager::new(&db_path).unwrap();
    manager
        .set_global_config_value(config_keys::DISRUPTION_THRESHOLD_DAYS, "15")
        .unwrap();
    manager
        .set_global_config_value(config_keys::NARRATIVE_LOCALE, "zh-CN")
        .unwrap();

    let api = RiskApi::open(&db_path, FeedMode::Offline).unwrap();
    assert_eq!(api.config().disruption_threshold_days, 15.0);

    let analysis = api.analyze_supplier(supplier_id).await.unwrap();
    // 平均延期 9 天 / T=15
    assert_eq!(analysis.schedule.r_schedule, 0.6);
    assert_eq!(analysis.schedule.disruption_threshold_days, 15.0);
    assert!(analysis.summary.contains("Delta Forge"));
    assert!(!analysis.summary.starts_with("Analysis of"));
}

#[test]
fn test_malformed_override_falls_back_to_default() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();
    manager
        .set_global_config_value(config_keys::ALTERNATIVE_LIMIT, "three")
        .unwrap();

    let config = manager.load_analysis_config().unwrap();
    assert_eq!(config.alternative_limit, 3);
}

#[test]
fn test_out_of_range_override_is_rejected() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();
    manager
        .set_global_config_value(config_keys::RECOMMENDATION_LIMIT, "0")
        .unwrap();

    assert!(matches!(
        RiskApi::open(&db_path, FeedMode::Offline),
        Err(ApiError::ConfigError(_))
    ));
}

#[test]
fn test_snapshot_round_trip_skips_api_key() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();
    manager
        .set_global_config_value(config_keys::GDELT_MAX_RECORDS, "25")
        .unwrap();
    manager
        .set_global_config_value(config_keys::NARRATIVE_API_KEY, "secret")
        .unwrap();

    let snapshot = manager.get_config_snapshot().unwrap();
    assert!(snapshot.contains("gdelt_max_records"));
    assert!(!snapshot.contains("secret"));

    let (_other_file, other_path) = create_test_db().expect("Failed to create test db");
    let restored = ConfigManager::new(&other_path).unwrap();
    assert_eq!(restored.restore_config_from_snapshot(&snapshot).unwrap(), 1);
    assert_eq!(restored.load_analysis_config().unwrap().gdelt_max_records, 25);
    assert!(!restored.load_analysis_config().unwrap().narrative_enabled());
}
