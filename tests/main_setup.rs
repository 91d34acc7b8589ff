use marketing_site::{
    AppConfig,
    config::{ConfigError, Env},
};
use serial_test::serial;
use std::{env, panic};

const CONFIG_VARS: &[&str] = &[
    "APP_ENV",
    "DATABASE_URL",
    "SESSION_SECRET",
    "SESSION_COOKIE",
    "SIGN_IN_PATH",
    "CLIENT_LANDING_PATH",
    "ADMIN_DASHBOARD_PATH",
    "S3_ENDPOINT",
    "S3_REGION",
    "S3_ACCESS_KEY",
    "S3_SECRET_KEY",
    "S3_BUCKET_NAME",
    "S3_PUBLIC_URL",
    "MAX_UPLOAD_BYTES",
    "BIND_ADDR",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with exactly `vars` set among the config variables, then
/// restores the previous environment.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

const PRODUCTION: &[(&str, &str)] = &[
    ("APP_ENV", "production"),
    ("DATABASE_URL", "postgres://user:pass@db/site"),
    ("SESSION_SECRET", "prod-secret"),
    ("S3_ENDPOINT", "https://s3.example.com"),
    ("S3_ACCESS_KEY", "key"),
    ("S3_SECRET_KEY", "secret"),
];

// --- Tests ---

#[test]
#[serial]
fn local_mode_uses_development_defaults() {
    let config = run_with_env(&[], AppConfig::load).unwrap();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.db_url, None);
    assert_eq!(config.session_cookie, "session-token");
    assert_eq!(config.sign_in_path, "/sign-in");
    assert_eq!(config.client_landing_path, "/client");
    assert_eq!(config.admin_dashboard_path, "/admin/dashboard");
    assert_eq!(config.s3_bucket, "site-uploads");
    assert_eq!(config.s3_public_url, "http://localhost:9000/site-uploads");
    assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert!(!config.session_secret.is_empty());
}

#[test]
#[serial]
fn production_loads_with_all_secrets() {
    let config = run_with_env(PRODUCTION, AppConfig::load).unwrap();

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.db_url.as_deref(), Some("postgres://user:pass@db/site"));
    assert_eq!(config.session_secret, "prod-secret");
    assert_eq!(config.s3_public_url, "https://s3.example.com/site-uploads");
}

#[test]
#[serial]
fn production_fails_fast_on_each_missing_secret() {
    for missing in [
        "DATABASE_URL",
        "SESSION_SECRET",
        "S3_ENDPOINT",
        "S3_ACCESS_KEY",
        "S3_SECRET_KEY",
    ] {
        let vars: Vec<(&str, &str)> = PRODUCTION
            .iter()
            .copied()
            .filter(|(key, _)| *key != missing)
            .collect();
        let result = run_with_env(&vars, AppConfig::load);
        assert_eq!(result.unwrap_err(), ConfigError::Missing(missing));
    }
}

#[test]
#[serial]
fn empty_values_count_as_missing() {
    let mut vars = PRODUCTION.to_vec();
    vars.retain(|(key, _)| *key != "SESSION_SECRET");
    vars.push(("SESSION_SECRET", "  "));

    let result = run_with_env(&vars, AppConfig::load);
    assert_eq!(result.unwrap_err(), ConfigError::Missing("SESSION_SECRET"));
}

#[test]
#[serial]
fn overrides_are_read() {
    let config = run_with_env(
        &[
            ("SESSION_COOKIE", "sid"),
            ("SIGN_IN_PATH", "/login"),
            ("S3_BUCKET_NAME", "media"),
            ("S3_PUBLIC_URL", "https://cdn.example.com"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ],
        AppConfig::load,
    )
    .unwrap();

    assert_eq!(config.session_cookie, "sid");
    assert_eq!(config.guard_targets().sign_in, "/login");
    assert_eq!(config.s3_bucket, "media");
    assert_eq!(config.s3_public_url, "https://cdn.example.com");
    assert_eq!(config.max_upload_bytes, 1024);
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
}

#[test]
#[serial]
fn invalid_upload_limit_is_rejected() {
    let result = run_with_env(&[("MAX_UPLOAD_BYTES", "lots")], AppConfig::load);
    assert_eq!(
        result.unwrap_err(),
        ConfigError::Invalid {
            var: "MAX_UPLOAD_BYTES",
            value: "lots".to_string(),
        }
    );
}
