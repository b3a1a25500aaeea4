pub mod error;
pub mod provision;

pub use error::*;
pub use provision::{
    ConflictPolicy, FirewallSettings, InstanceSettings, NetworkSettings, ProvisionConfig,
    ReadinessConfig, SubnetSettings,
};

use std::path::{Path, PathBuf};

/// Environment variable pointing at a config file
pub const CONFIG_PATH_ENV: &str = "VPCFLOW_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["vpcflow.local.yaml", "vpcflow.yaml"];

/// vpcflowの設定ディレクトリ (~/.config/vpcflow) を取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("vpcflow");

    Ok(config_dir)
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 VPCFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: vpcflow.local.yaml, vpcflow.yaml
/// 3. ~/.config/vpcflow/vpcflow.yaml (グローバル設定)
///
/// 見つからない場合は `None` (組み込みのデフォルト値を使う)
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("vpcflow.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// Load the configuration for one run
///
/// An explicit path must exist. Without one the discovered file is used, and
/// the built-in defaults when nothing is found. The result is validated.
pub fn load(explicit: Option<&Path>) -> Result<ProvisionConfig> {
    let path = match explicit {
        Some(path) if path.exists() => Some(path.to_path_buf()),
        Some(path) => return Err(ConfigError::ConfigFileNotFound(path.to_path_buf())),
        None => find_config_file()?,
    };

    let config = match path {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            load_file(&path)?
        }
        None => {
            tracing::debug!("No config file found, using built-in defaults");
            ProvisionConfig::default()
        }
    };

    config.validate()?;
    Ok(config)
}

/// Parse one YAML config file
pub fn load_file(path: &Path) -> Result<ProvisionConfig> {
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
