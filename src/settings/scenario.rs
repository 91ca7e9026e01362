use serde::Deserialize;
use crate::host::VersionComparison;
use super::{parse_env_var, SettingsError};
pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, Deserialize)]
pub struct ImageSettings {
    #[serde(default = "default_debian_image")]
    pub debian: String,

    /// dnf 시나리오 이미지 (fedora 30 고정은 kata-containers/tests#2358 때문)
    #[serde(default = "default_fedora_image")]
    pub fedora: String,

    #[serde(default = "default_centos_image")]
    pub centos: String,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            debian: default_debian_image(),
            fedora: default_fedora_image(),
            centos: default_centos_image(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioSettings {
    #[serde(default)]
    pub images: ImageSettings,

    /// 호스트 버전 비교 방식
    #[serde(default)]
    pub version_comparison: VersionComparison,
}

impl ScenarioSettings {
    pub fn from_env() -> Result<Self> {
        let settings = Self {
            images: ImageSettings {
                debian: parse_env_var("PKGCHECK_DEBIAN_IMAGE", default_debian_image)?,
                fedora: parse_env_var("PKGCHECK_FEDORA_IMAGE", default_fedora_image)?,
                centos: parse_env_var("PKGCHECK_CENTOS_IMAGE", default_centos_image)?,
            },
            version_comparison: parse_env_var("PKGCHECK_VERSION_COMPARISON", VersionComparison::default)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let images = [
            ("PKGCHECK_DEBIAN_IMAGE", &self.images.debian),
            ("PKGCHECK_FEDORA_IMAGE", &self.images.fedora),
            ("PKGCHECK_CENTOS_IMAGE", &self.images.centos),
        ];

        for (var_name, image) in images {
            if image.trim().is_empty() {
                return Err(SettingsError::EnvVarInvalid {
                    var_name: var_name.to_string(),
                    value: image.clone(),
                    reason: "이미지 이름은 비어있을 수 없습니다".to_string(),
                });
            }
            if image.chars().any(char::is_whitespace) {
                return Err(SettingsError::EnvVarInvalid {
                    var_name: var_name.to_string(),
                    value: image.clone(),
                    reason: "이미지 이름에 공백을 넣을 수 없습니다".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn default_debian_image() -> String {
    "debian".to_string()
}

fn default_fedora_image() -> String {
    "fedora:30".to_string()
}

fn default_centos_image() -> String {
    "centos".to_string()
}
