use std::{env, fs, path::Path};
use serde::Deserialize;
use tracing::debug;

pub mod docker;
mod error;
pub mod logging;
pub mod retry;
pub mod scenario;

pub use docker::{DockerBackend, DockerSettings};
pub use error::SettingsError;
pub use logging::LogSettings;
pub use retry::RetrySettings;
pub use scenario::{ImageSettings, ScenarioSettings};

pub type Result<T> = std::result::Result<T, SettingsError>;

/// 설정 파일 경로를 지정하는 환경 변수
pub const CONFIG_FILE_VAR: &str = "PKGCHECK_CONFIG_FILE";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    // 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,

    #[serde(default)]
    pub docker: DockerSettings,

    // 재시도 정책
    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub scenarios: ScenarioSettings,
}

impl Settings {
    pub fn load() -> Result<Self> {
        if let Ok(config_path) = env::var(CONFIG_FILE_VAR) {
            Self::from_toml_file(&config_path)
        } else {
            Self::from_env()
        }
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| SettingsError::FileError {
            path: path.as_ref().to_string_lossy().to_string(),
            error: e,
        })?;

        let settings: Self = toml::from_str(&content)
            .map_err(|e| SettingsError::ParseError { source: e })?;

        debug!(path = %path.as_ref().display(), "설정 파일 로드");
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_env() -> Result<Self> {
        let settings = Self {
            logging: LogSettings::from_env()?,
            docker: DockerSettings::from_env()?,
            retry: RetrySettings::from_env()?,
            scenarios: ScenarioSettings::from_env()?,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<()> {
        self.docker.validate()?;
        self.retry.validate()?;
        self.scenarios.validate()?;
        Ok(())
    }
}

pub fn parse_env_var<T: std::str::FromStr, F: FnOnce() -> T>(name: &str, default: F) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: val,
            reason: e.to_string(),
        }),
        Err(env::VarError::NotPresent) => Ok(default()),
        Err(e) => Err(SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: "".to_string(),
            reason: e.to_string(),
        }),
    }
}
