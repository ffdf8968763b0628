//! Command implementations
//!
//! Every command writes its report to `out` and returns whether it
//! succeeded, so `main` can pick the exit code.

use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use keytier_core::{
    default_data_dir, ApiKeyManager, FileParameterStore, KeychainProvider, ParameterStore,
    SettingsManager,
};

use crate::cli::{Args, Command, KeychainCommand, ParamCommand, SettingsCommand};

pub type CommandResult = std::result::Result<bool, Box<dyn std::error::Error>>;

/// Run a parsed command line
pub async fn run(args: Args, out: &mut dyn Write) -> CommandResult {
    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    debug!("Using data directory {:?}", data_dir);

    match args.command {
        Command::Resolve { reveal } => resolve(&data_dir, reveal, out),
        Command::Sources => sources(&data_dir, out),
        Command::Param { action } => param(&data_dir, action, out),
        Command::Keychain { action } => keychain(&data_dir, action, out),
        Command::Settings { action } => settings(&data_dir, action, out).await,
    }
}

fn manager(data_dir: &Path) -> ApiKeyManager {
    let settings = SettingsManager::new(data_dir);
    ApiKeyManager::from_settings(settings.get(), data_dir)
}

fn resolve(data_dir: &Path, reveal: bool, out: &mut dyn Write) -> CommandResult {
    let manager = manager(data_dir);

    match manager.get_api_key() {
        Some(resolved) => {
            let shown = if reveal {
                resolved.value.expose().to_string()
            } else {
                resolved.value.masked()
            };
            writeln!(out, "{}: {}", resolved.source_label, shown)?;
            Ok(true)
        }
        None => {
            writeln!(
                out,
                "No credential found in any tier ({})",
                manager.labels().join(", ")
            )?;
            Ok(false)
        }
    }
}

fn sources(data_dir: &Path, out: &mut dyn Write) -> CommandResult {
    let manager = manager(data_dir);

    for (position, label) in manager.labels().iter().enumerate() {
        writeln!(out, "{}. {}", position + 1, label)?;
    }

    Ok(true)
}

fn parameter_path(data_dir: &Path) -> PathBuf {
    SettingsManager::new(data_dir).get().parameter_file_in(data_dir)
}

fn param(data_dir: &Path, action: ParamCommand, out: &mut dyn Write) -> CommandResult {
    let store = FileParameterStore::open(parameter_path(data_dir))?;

    match action {
        ParamCommand::Get { key } => match store.get_param(&key)? {
            Some(value) => {
                writeln!(out, "{}", value)?;
                Ok(true)
            }
            None => {
                writeln!(out, "Parameter not set: {}", key)?;
                Ok(false)
            }
        },
        ParamCommand::Set { key, value } => {
            let value = match value {
                Some(value) => value,
                None => rpassword::prompt_password(format!("Value for {}: ", key))?,
            };
            store.set_param(&key, &value)?;
            info!("Parameter {} updated in {:?}", key, store.path());
            writeln!(out, "Set {}", key)?;
            Ok(true)
        }
        ParamCommand::Unset { key } => {
            let existed = store.unset_param(&key)?;
            if existed {
                writeln!(out, "Removed {}", key)?;
            } else {
                writeln!(out, "Parameter not set: {}", key)?;
            }
            Ok(existed)
        }
        ParamCommand::List => {
            for key in store.list_keys()? {
                writeln!(out, "{}", key)?;
            }
            Ok(true)
        }
    }
}

fn keychain(data_dir: &Path, action: KeychainCommand, out: &mut dyn Write) -> CommandResult {
    let settings = SettingsManager::new(data_dir);
    let keychain = &settings.get().keychain;
    let provider = KeychainProvider::new(&keychain.service, &keychain.account);
    let entry = format!("{}/{}", keychain.service, keychain.account);

    match action {
        KeychainCommand::Set { value } => {
            let value = match value {
                Some(value) => value,
                None => rpassword::prompt_password(format!("Value for {}: ", entry))?,
            };
            provider.store(&value)?;
            info!("Keychain entry {} updated", entry);
            writeln!(out, "Stored keychain entry {}", entry)?;
        }
        KeychainCommand::Unset => {
            provider.delete()?;
            writeln!(out, "Removed keychain entry {}", entry)?;
        }
    }

    if !keychain.enabled {
        writeln!(
            out,
            "Note: the keychain tier is disabled; set keychain.enabled in {}",
            settings.settings_file().display()
        )?;
    }

    Ok(true)
}

async fn settings(data_dir: &Path, action: SettingsCommand, out: &mut dyn Write) -> CommandResult {
    let mut manager = SettingsManager::new(data_dir);

    match action {
        SettingsCommand::Show => {
            writeln!(out, "{}", serde_json::to_string_pretty(manager.get())?)?;
            Ok(true)
        }
        SettingsCommand::Init { force } => {
            if manager.exists() && !force {
                writeln!(
                    out,
                    "Settings already exist at {} (use --force to overwrite)",
                    manager.settings_file().display()
                )?;
                return Ok(false);
            }

            manager.reset().await?;
            manager.save().await?;
            writeln!(out, "Wrote {}", manager.settings_file().display())?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use keytier_core::{JsonlAuditSink, Settings};
    use tempfile::TempDir;

    async fn run_in(dir: &Path, argv: &[&str]) -> (bool, String) {
        let mut full = vec!["keytier", "--data-dir", dir.to_str().unwrap()];
        full.extend_from_slice(argv);
        let args = Args::try_parse_from(full).unwrap();

        let mut out = Vec::new();
        let ok = run(args, &mut out).await.unwrap();
        (ok, String::from_utf8(out).unwrap())
    }

    async fn write_settings(dir: &Path, settings: Settings) {
        let mut manager = SettingsManager::new(dir);
        manager.update(settings).await.unwrap();
    }

    fn isolated_settings(dir: &Path) -> Settings {
        Settings {
            env_var: "KEYTIER_CLI_TEST_UNSET".to_string(),
            audit: keytier_core::settings::AuditSettings {
                log_file: Some(dir.join("audit.jsonl")),
                database: None,
            },
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_settings_init_and_show() {
        let temp_dir = TempDir::new().unwrap();

        let (ok, output) = run_in(temp_dir.path(), &["settings", "init"]).await;
        assert!(ok);
        assert!(output.starts_with("Wrote"));

        let (ok, output) = run_in(temp_dir.path(), &["settings", "init"]).await;
        assert!(!ok);
        assert!(output.contains("--force"));

        let (ok, output) = run_in(temp_dir.path(), &["settings", "show"]).await;
        assert!(ok);
        assert!(output.contains("\"envVar\": \"GOOGLE_API_KEY\""));
    }

    #[tokio::test]
    async fn test_param_lifecycle() {
        let temp_dir = TempDir::new().unwrap();

        let (ok, _) = run_in(
            temp_dir.path(),
            &["param", "set", "google_api_key", "AIza-1234567890"],
        )
        .await;
        assert!(ok);

        let (ok, output) = run_in(temp_dir.path(), &["param", "get", "google_api_key"]).await;
        assert!(ok);
        assert_eq!(output.trim(), "AIza-1234567890");

        let (_, output) = run_in(temp_dir.path(), &["param", "list"]).await;
        assert_eq!(output.trim(), "google_api_key");

        let (ok, _) = run_in(temp_dir.path(), &["param", "unset", "google_api_key"]).await;
        assert!(ok);
        let (ok, _) = run_in(temp_dir.path(), &["param", "get", "google_api_key"]).await;
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_resolve_from_parameters() {
        let temp_dir = TempDir::new().unwrap();
        write_settings(temp_dir.path(), isolated_settings(temp_dir.path())).await;

        let (ok, output) = run_in(temp_dir.path(), &["resolve"]).await;
        assert!(!ok);
        assert!(output.starts_with("No credential found"));
        assert!(JsonlAuditSink::new(temp_dir.path().join("audit.jsonl"))
            .read_all()
            .unwrap()
            .is_empty());

        run_in(
            temp_dir.path(),
            &["param", "set", "google_api_key", "AIza-1234567890"],
        )
        .await;

        let (ok, output) = run_in(temp_dir.path(), &["resolve"]).await;
        assert!(ok);
        assert_eq!(output.trim(), "Low Security (System Parameters): AIza...");

        let (_, output) = run_in(temp_dir.path(), &["resolve", "--reveal"]).await;
        assert!(output.contains("AIza-1234567890"));

        let records = JsonlAuditSink::new(temp_dir.path().join("audit.jsonl"))
            .read_all()
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_keychain_set_and_unset() {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        let temp_dir = TempDir::new().unwrap();

        let (ok, output) = run_in(temp_dir.path(), &["keychain", "set", "AIza-keychain"]).await;
        assert!(ok);
        assert!(output.starts_with("Stored keychain entry keytier/google_api_key"));
        assert!(output.contains("keychain tier is disabled"));

        let mut settings = isolated_settings(temp_dir.path());
        settings.keychain.enabled = true;
        write_settings(temp_dir.path(), settings).await;

        let (ok, output) = run_in(temp_dir.path(), &["keychain", "unset"]).await;
        assert!(ok);
        assert_eq!(output.trim(), "Removed keychain entry keytier/google_api_key");
    }

    #[tokio::test]
    async fn test_sources_listing() {
        let temp_dir = TempDir::new().unwrap();
        let mut settings = isolated_settings(temp_dir.path());
        settings.config_file = Some(temp_dir.path().join("server.yaml"));
        write_settings(temp_dir.path(), settings).await;

        let (ok, output) = run_in(temp_dir.path(), &["sources"]).await;
        assert!(ok);
        assert_eq!(
            output.lines().collect::<Vec<_>>(),
            vec![
                "1. High Security (Environment Variable)",
                "2. Medium Security (Config File)",
                "3. Low Security (System Parameters)",
            ]
        );
    }
}
