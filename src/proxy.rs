use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::docker::{ContainerHandle, DockerClient, DockerError};

/// 호스트에서 읽는 프록시 환경 변수
pub const PROXY_VAR: &str = "http_proxy";

/// 호스트의 HTTP 프록시 설정 (읽기 전용)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySetting {
    value: String,
}

impl ProxySetting {
    /// 값이 비어 있으면 `None`
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self { value })
        }
    }

    pub fn from_env() -> Option<Self> {
        let setting = env::var(PROXY_VAR).ok().and_then(Self::new);
        match &setting {
            Some(proxy) => info!(proxy = %proxy.value, "호스트 프록시 감지"),
            None => debug!("호스트 프록시 없음"),
        }
        setting
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// `http_proxy=<value>`
    pub fn env_entry(&self) -> String {
        format!("{}={}", PROXY_VAR, self.value)
    }

    /// 컨테이너 생성 인자 `-e http_proxy=<value>`
    pub fn creation_args(&self) -> Vec<String> {
        vec!["-e".to_string(), self.env_entry()]
    }

    /// 패키지 관리자 설정 파일에 추가할 줄
    pub fn config_line(&self) -> String {
        format!("proxy={}", self.value)
    }

    /// 설정 파일 끝에 `proxy=<value>` 를 한 번만 추가하는 명령
    ///
    /// 값과 경로는 위치 인자로 넘기므로 따옴표 처리가 필요 없습니다.
    pub fn config_edit_command(&self, config_file: &Path) -> Vec<String> {
        vec![
            "sh".to_string(),
            "-c".to_string(),
            r#"grep -qxF -- "$1" "$2" || printf '%s\n' "$1" >> "$2""#.to_string(),
            "sh".to_string(),
            self.config_line(),
            config_file.display().to_string(),
        ]
    }
}

/// 호스트 프록시를 컨테이너 생성과 패키지 관리자 설정에 전달
#[derive(Debug, Clone, Default)]
pub struct ProxyConfigurator {
    setting: Option<ProxySetting>,
}

impl ProxyConfigurator {
    pub fn new(setting: Option<ProxySetting>) -> Self {
        Self { setting }
    }

    pub fn from_env() -> Self {
        Self::new(ProxySetting::from_env())
    }

    pub fn setting(&self) -> Option<&ProxySetting> {
        self.setting.as_ref()
    }

    /// 컨테이너 생성 인자 (프록시가 없으면 비어 있음)
    pub fn creation_args(&self) -> Vec<String> {
        self.setting
            .as_ref()
            .map(ProxySetting::creation_args)
            .unwrap_or_default()
    }

    /// 컨테이너 정보에 프록시 환경 변수를 붙입니다.
    pub fn decorate(&self, handle: ContainerHandle) -> ContainerHandle {
        match &self.setting {
            Some(proxy) => handle.with_env(proxy.env_entry()),
            None => handle,
        }
    }

    /// 패키지 관리자 설정 파일을 수정합니다.
    ///
    /// 프록시가 없으면 아무것도 하지 않고 `None`, 있으면 편집 명령의 종료 코드를 반환합니다.
    #[instrument(skip(self, client, config_file), fields(config_file = %config_file.display()))]
    pub async fn apply(
        &self,
        client: &dyn DockerClient,
        timeout: Duration,
        container: &str,
        config_file: &Path,
    ) -> Result<Option<i64>, DockerError> {
        let Some(proxy) = &self.setting else {
            return Ok(None);
        };

        let command = proxy.config_edit_command(config_file);
        let output = client.exec_in_container(timeout, container, &command).await?;
        info!(container = %container, exit_code = output.exit_code, "패키지 관리자 프록시 설정");
        Ok(Some(output.exit_code))
    }
}
