use std::{env, fs};

use neuroscreen_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    // Create a temporary TOML configuration file
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("neuroscreen.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081
body_limit_bytes = 1048576

[model]
path = "artifacts/voice.onnx"

[gemini]
api_keys = ["file-key"]
models = ["models/gemini-2.0-flash"]
poll_interval_ms = 500
max_attempts = 10

[logging]
level = "debug"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.server.body_limit_bytes, 1_048_576);
    assert_eq!(cfg.model.path, "artifacts/voice.onnx");
    assert_eq!(cfg.gemini.api_keys, vec!["file-key".to_string()]);
    assert_eq!(cfg.gemini.models.len(), 1);
    assert_eq!(cfg.gemini.max_attempts, 10);
    assert_eq!(cfg.logging.level.to_ascii_lowercase(), "debug");

    // 2) Env override should win over file
    unsafe {
        env::set_var("NEUROSCREEN__SERVER__PORT", "9090");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.server.port, 9090);
    // cleanup env var
    unsafe {
        env::remove_var("NEUROSCREEN__SERVER__PORT");
    }

    // 3) Numbered API key variables fill in when the file has none
    let keyless_path = dir.path().join("keyless.toml");
    fs::write(&keyless_path, "[server]\nport = 8082\n").expect("write toml");
    unsafe {
        env::set_var("API_KEY_1", "env-key-a");
        env::set_var("API_KEY_3", "env-key-b");
    }
    let cfg_keys = load_config(keyless_path.to_str()).expect("should parse keyless config");
    assert_eq!(
        cfg_keys.gemini.api_keys,
        vec!["env-key-a".to_string(), "env-key-b".to_string()]
    );
    unsafe {
        env::remove_var("API_KEY_1");
        env::remove_var("API_KEY_3");
    }

    // 4) Invalid config (no models to fall back to) should error
    let invalid_path = dir.path().join("invalid.toml");
    let invalid_toml = r#"
[gemini]
models = []
"#;
    fs::write(&invalid_path, invalid_toml).expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).unwrap_err();
    assert!(err.contains("gemini.models"), "unexpected error: {err}");

    // 5) Invalid log level should error
    let bad_level_path = dir.path().join("bad_level.toml");
    fs::write(&bad_level_path, "[logging]\nlevel = \"verbose\"\n").expect("write toml");
    assert!(load_config(bad_level_path.to_str()).is_err());

    // 6) Missing file falls back to defaults
    // (kept in this test because the env manipulation above would race a
    // parallel test in the same binary)
    let cfg = load_config(Some("/definitely/not/here/neuroscreen.toml")).expect("defaults");
    assert_eq!(cfg.server.port, 8000);
    assert_eq!(cfg.gemini.models.len(), 2);
}
