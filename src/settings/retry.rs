use serde::Deserialize;
use super::{parse_env_var, SettingsError};
pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// 최대 시도 횟수
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// 시도 한 번의 시간 제한 (초)
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout: u64,

    /// 재시도 간격 (초)
    #[serde(default)]
    pub interval: u64,
}

impl RetrySettings {
    pub fn from_env() -> Result<Self> {
        let settings = Self {
            max_attempts: parse_env_var("PKGCHECK_MAX_ATTEMPTS", default_max_attempts)?,
            attempt_timeout: parse_env_var("PKGCHECK_ATTEMPT_TIMEOUT", default_attempt_timeout)?,
            interval: parse_env_var("PKGCHECK_RETRY_INTERVAL", || 0)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "PKGCHECK_MAX_ATTEMPTS".to_string(),
                value: self.max_attempts.to_string(),
                reason: "최소 한 번은 시도해야 합니다".to_string(),
            });
        }

        if self.attempt_timeout == 0 {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "PKGCHECK_ATTEMPT_TIMEOUT".to_string(),
                value: self.attempt_timeout.to_string(),
                reason: "시간 제한은 0이 될 수 없습니다".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            attempt_timeout: default_attempt_timeout(),
            interval: 0,
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_attempt_timeout() -> u64 {
    900 // 15분
}
