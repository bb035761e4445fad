use super::*;

#[test]
fn missing_file_yields_defaults() {
    let config = Config::load(Path::new("/nonexistent/path/webresearch.toml")).unwrap();
    assert_eq!(config.orchestrator.max_tool_calls, RunBudget::default().max_tool_calls);
}

#[test]
fn partial_toml_fills_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[orchestrator]\nmax_tool_calls = 5\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.orchestrator.max_tool_calls, 5);
    assert_eq!(config.cache.max_entries, CacheConfig::default().max_entries);
}

#[test]
fn robots_config_round_trips_into_manager_config() {
    let config = RobotsConfig {
        user_agent: "testbot/1.0".to_string(),
        memory_ttl_secs: 60,
        allow_private_hosts: true,
    };
    let manager_config = config.to_manager_config();
    assert_eq!(manager_config.user_agent, "testbot/1.0");
    assert_eq!(manager_config.memory_ttl.as_secs(), 60);
    assert!(manager_config.allow_private_hosts);
}
