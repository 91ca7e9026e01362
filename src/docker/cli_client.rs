use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{CommandOutput, ContainerHandle, DockerClient, DockerError, TIMEOUT_EXIT_CODE};

/// 관리 명령(run, rm, inspect)에 쓰는 시간 제한
const MANAGEMENT_TIMEOUT: Duration = Duration::from_secs(300);

/// `docker` 실행 파일을 호출하는 클라이언트
#[derive(Debug, Clone)]
pub struct CliDockerClient {
    binary: String,
}

impl CliDockerClient {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// 시간 제한 안에서 docker 명령을 실행합니다.
    ///
    /// 시간이 초과되면 프로세스를 종료하고 종료 코드 -1 을 보고합니다.
    async fn run(&self, timeout: Duration, args: &[String]) -> Result<CommandOutput, DockerError> {
        debug!(binary = %self.binary, args = ?args, "docker 명령 실행");

        let child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DockerError::InvocationError {
                program: self.binary.clone(),
                source: e,
                context: args.first().cloned().unwrap_or_default(),
            })?;

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Err(_) => {
                warn!(args = ?args, timeout_secs = timeout.as_secs(), "docker 명령 시간 초과");
                Ok(CommandOutput::timed_out(timeout))
            }
            Ok(Err(e)) => Err(DockerError::InvocationError {
                program: self.binary.clone(),
                source: e,
                context: args.first().cloned().unwrap_or_default(),
            }),
            Ok(Ok(output)) => Ok(CommandOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                // 시그널로 종료된 경우 코드가 없음
                exit_code: output.status.code().map(i64::from).unwrap_or(TIMEOUT_EXIT_CODE),
            }),
        }
    }
}

impl Default for CliDockerClient {
    fn default() -> Self {
        Self::new("docker")
    }
}

#[async_trait]
impl DockerClient for CliDockerClient {
    async fn create_container(&self, handle: &ContainerHandle) -> Result<CommandOutput, DockerError> {
        let mut args = vec!["run".to_string()];
        args.extend(handle.creation_args());
        self.run(MANAGEMENT_TIMEOUT, &args).await
    }

    async fn exec_in_container(
        &self,
        timeout: Duration,
        container: &str,
        command: &[String],
    ) -> Result<CommandOutput, DockerError> {
        let mut args = vec!["exec".to_string(), container.to_string()];
        args.extend(command.iter().cloned());
        self.run(timeout, &args).await
    }

    async fn remove_container(&self, name: &str) -> Result<bool, DockerError> {
        let args = ["rm".to_string(), "-f".to_string(), name.to_string()];
        let output = self.run(MANAGEMENT_TIMEOUT, &args).await?;
        if !output.success() {
            warn!(container = %name, exit_code = output.exit_code, stderr = %output.stderr.trim(), "컨테이너 삭제 실패");
        }
        Ok(output.success())
    }

    async fn container_exists(&self, name: &str) -> Result<bool, DockerError> {
        let args = [
            "inspect".to_string(),
            "--type".to_string(),
            "container".to_string(),
            name.to_string(),
        ];
        let output = self.run(MANAGEMENT_TIMEOUT, &args).await?;
        Ok(output.success())
    }
}
