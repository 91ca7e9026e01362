// src/docker/client.rs
use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use super::{ContainerHandle, DockerError};

/// 시간 초과로 중단된 명령에 보고되는 종료 코드
pub const TIMEOUT_EXIT_CODE: i64 = -1;

/// 데몬 측 오류에 보고되는 종료 코드 (docker CLI 와 동일)
pub const DAEMON_ERROR_EXIT_CODE: i64 = 125;

/// 명령 한 번의 실행 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i64,
}

impl CommandOutput {
    pub fn with_exit_code(exit_code: i64) -> Self {
        Self {
            exit_code,
            ..Default::default()
        }
    }

    pub fn timed_out(timeout: Duration) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("명령이 {}초 안에 끝나지 않음", timeout.as_secs()),
            exit_code: TIMEOUT_EXIT_CODE,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout 과 stderr 을 합친 출력
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        out.push_str(&self.stderr);
        out
    }
}

/// 컨테이너 런타임과의 경계
///
/// `Err` 는 호출 자체가 실패한 경우(프로세스 실행 불가, 데몬 연결 불가)에만
/// 반환됩니다. 0이 아닌 종료 코드는 `Ok` 로 전달됩니다.
#[async_trait]
pub trait DockerClient: Send + Sync {
    /// 분리 모드로 이름 있는 컨테이너를 시작
    async fn create_container(&self, handle: &ContainerHandle) -> Result<CommandOutput, DockerError>;

    /// 실행 중인 컨테이너 안에서 명령 실행, `timeout` 초과 시 중단
    async fn exec_in_container(
        &self,
        timeout: Duration,
        container: &str,
        command: &[String],
    ) -> Result<CommandOutput, DockerError>;

    /// 컨테이너 삭제, 성공 여부 반환
    async fn remove_container(&self, name: &str) -> Result<bool, DockerError>;

    async fn container_exists(&self, name: &str) -> Result<bool, DockerError>;

    /// 시나리오마다 겹치지 않는 컨테이너 이름
    fn random_name(&self) -> String {
        random_container_name()
    }
}

pub fn random_container_name() -> String {
    format!("pkgcheck-{}", Uuid::new_v4().simple())
}
