use serde::Deserialize;
use super::{parse_env_var, SettingsError};
pub type Result<T> = std::result::Result<T, SettingsError>;

/// 컨테이너 런타임 접근 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockerBackend {
    /// Docker Engine API (bollard)
    #[default]
    Api,
    /// `docker` 실행 파일
    Cli,
}

impl std::str::FromStr for DockerBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "api" => Ok(DockerBackend::Api),
            "cli" => Ok(DockerBackend::Cli),
            _ => Err(format!("알 수 없는 Docker 백엔드: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DockerSettings {
    #[serde(default)]
    pub backend: DockerBackend,

    /// CLI 백엔드가 실행할 파일
    #[serde(default = "default_docker_binary")]
    pub binary: String,
}

impl DockerSettings {
    pub fn from_env() -> Result<Self> {
        let settings = Self {
            backend: parse_env_var("PKGCHECK_DOCKER_BACKEND", DockerBackend::default)?,
            binary: parse_env_var("PKGCHECK_DOCKER_BINARY", default_docker_binary)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend == DockerBackend::Cli && self.binary.trim().is_empty() {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "PKGCHECK_DOCKER_BINARY".to_string(),
                value: self.binary.clone(),
                reason: "CLI 백엔드는 실행 파일 경로가 필요합니다".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for DockerSettings {
    fn default() -> Self {
        Self {
            backend: DockerBackend::default(),
            binary: default_docker_binary(),
        }
    }
}

fn default_docker_binary() -> String {
    "docker".to_string()
}
