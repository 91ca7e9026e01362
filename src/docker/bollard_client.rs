use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, LogOutput, RemoveContainerOptions,
    StartContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::image::CreateImageOptions;
use bollard::models::HostConfig;
use bollard::Docker;
use futures_util::stream::StreamExt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::{CommandOutput, ContainerHandle, DockerClient, DockerError, DAEMON_ERROR_EXIT_CODE};

/// Docker Engine API 를 사용하는 클라이언트
pub struct BollardDockerClient(Docker);

impl BollardDockerClient {
    /// Docker 클라이언트를 초기화합니다.
    pub fn connect_local() -> Result<Self, DockerError> {
        let docker = Docker::connect_with_local_defaults().map_err(|e| DockerError::ConnectionError {
            source: e,
            context: "로컬 Docker 소켓 연결".to_string(),
        })?;
        Ok(Self(docker))
    }

    pub fn new(docker: Docker) -> Self {
        Self(docker)
    }

    /// 로컬에 이미지가 있는지 확인하고, 없을 때만 받아옵니다.
    async fn ensure_image(&self, image: &str) -> Result<Option<String>, DockerError> {
        match pull_required(self.0.inspect_image(image).await) {
            Ok(false) => {
                debug!(image = %image, "로컬 이미지 사용");
                Ok(None)
            }
            Ok(true) => {
                info!(image = %image, "로컬 이미지 없음, 다운로드 시작");
                self.pull_image(image).await
            }
            Err(BollardError::DockerResponseServerError { message, .. }) => Ok(Some(message)),
            Err(e) => Err(DockerError::ApiError {
                source: e,
                context: format!("이미지 {} 조회", image),
            }),
        }
    }

    async fn pull_image(&self, image: &str) -> Result<Option<String>, DockerError> {
        let (from_image, tag) = split_image_reference(image);
        let options = Some(CreateImageOptions {
            from_image,
            tag,
            ..Default::default()
        });

        let mut progress = Box::pin(self.0.create_image(options, None, None));
        while let Some(item) = progress.next().await {
            match item {
                Ok(info) => {
                    if let Some(status) = info.status {
                        debug!(image = %image, status = %status, "이미지 다운로드 진행");
                    }
                }
                Err(BollardError::DockerResponseServerError { message, .. }) => {
                    return Ok(Some(message));
                }
                Err(e) => {
                    return Err(DockerError::ApiError {
                        source: e,
                        context: format!("이미지 {} 다운로드", image),
                    });
                }
            }
        }
        Ok(None)
    }

    async fn run_exec(&self, container: &str, command: &[String]) -> Result<CommandOutput, BollardError> {
        let exec = self
            .0
            .create_exec(
                container,
                CreateExecOptions {
                    cmd: Some(command.to_vec()),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        let mut result = CommandOutput::default();
        if let StartExecResults::Attached { mut output, .. } = self.0.start_exec(&exec.id, None).await? {
            while let Some(chunk) = output.next().await {
                match chunk? {
                    LogOutput::StdErr { message } => {
                        result.stderr.push_str(&String::from_utf8_lossy(&message));
                    }
                    LogOutput::StdOut { message } | LogOutput::Console { message } => {
                        result.stdout.push_str(&String::from_utf8_lossy(&message));
                    }
                    LogOutput::StdIn { .. } => {}
                }
            }
        }

        // 출력 스트림이 닫힌 직후에는 exec 가 아직 끝나지 않았을 수 있음
        let mut inspected = self.0.inspect_exec(&exec.id).await?;
        for _ in 0..EXEC_SETTLE_CHECKS {
            if exec_settled(inspected.exit_code, inspected.running) {
                break;
            }
            sleep(EXEC_SETTLE_INTERVAL).await;
            inspected = self.0.inspect_exec(&exec.id).await?;
        }

        result.exit_code = match inspected.exit_code {
            Some(code) => code,
            None => {
                warn!(
                    container = %container,
                    exec_id = %exec.id,
                    running = ?inspected.running,
                    "exec 종료 코드를 얻지 못함"
                );
                DAEMON_ERROR_EXIT_CODE
            }
        };
        Ok(result)
    }
}

/// exec 종료 코드를 다시 조회할 횟수와 간격
const EXEC_SETTLE_CHECKS: usize = 10;
const EXEC_SETTLE_INTERVAL: Duration = Duration::from_millis(100);

/// 종료 코드가 나왔거나 더 이상 실행 중이 아니면 기다릴 필요가 없음
fn exec_settled(exit_code: Option<i64>, running: Option<bool>) -> bool {
    exit_code.is_some() || running != Some(true)
}

/// 이미지 조회 결과로 다운로드가 필요한지 판단합니다. 404 일 때만 받아옵니다.
fn pull_required<T>(inspected: Result<T, BollardError>) -> Result<bool, BollardError> {
    match inspected {
        Ok(_) => Ok(false),
        Err(BollardError::DockerResponseServerError { status_code: 404, .. }) => Ok(true),
        Err(e) => Err(e),
    }
}

/// `repo:tag` 또는 `repo@digest` 를 나눕니다. 둘 다 없으면 `latest`.
fn split_image_reference(image: &str) -> (String, String) {
    if let Some((repo, digest)) = image.split_once('@') {
        return (repo.to_string(), digest.to_string());
    }

    let name_start = image.rfind('/').map(|i| i + 1).unwrap_or(0);
    match image[name_start..].rfind(':') {
        Some(i) => {
            let split = name_start + i;
            (image[..split].to_string(), image[split + 1..].to_string())
        }
        None => (image.to_string(), "latest".to_string()),
    }
}

fn daemon_failure(message: String) -> CommandOutput {
    CommandOutput {
        stdout: String::new(),
        stderr: message,
        exit_code: DAEMON_ERROR_EXIT_CODE,
    }
}

#[async_trait]
impl DockerClient for BollardDockerClient {
    async fn create_container(&self, handle: &ContainerHandle) -> Result<CommandOutput, DockerError> {
        if let Some(message) = self.ensure_image(&handle.image).await? {
            warn!(image = %handle.image, error = %message, "이미지 다운로드 실패");
            return Ok(daemon_failure(message));
        }

        let options = Some(CreateContainerOptions {
            name: handle.name.clone(),
            ..Default::default()
        });
        let config = Config {
            image: Some(handle.image.clone()),
            cmd: Some(handle.command.clone()),
            env: Some(handle.env.clone()),
            tty: Some(true),
            host_config: Some(HostConfig {
                auto_remove: Some(handle.auto_remove),
                ..Default::default()
            }),
            ..Default::default()
        };

        let created = match self.0.create_container(options, config).await {
            Ok(created) => created,
            Err(BollardError::DockerResponseServerError { message, .. }) => return Ok(daemon_failure(message)),
            Err(e) => {
                return Err(DockerError::ApiError {
                    source: e,
                    context: format!("컨테이너 {} 생성", handle.name),
                })
            }
        };

        match self.0.start_container(&handle.name, None::<StartContainerOptions<String>>).await {
            Ok(()) => {
                info!(container = %handle.name, id = %created.id, "컨테이너 시작");
                Ok(CommandOutput {
                    stdout: created.id,
                    ..Default::default()
                })
            }
            Err(BollardError::DockerResponseServerError { message, .. }) => Ok(daemon_failure(message)),
            Err(e) => Err(DockerError::ApiError {
                source: e,
                context: format!("컨테이너 {} 시작", handle.name),
            }),
        }
    }

    async fn exec_in_container(
        &self,
        timeout: Duration,
        container: &str,
        command: &[String],
    ) -> Result<CommandOutput, DockerError> {
        match tokio::time::timeout(timeout, self.run_exec(container, command)).await {
            Err(_) => {
                warn!(container = %container, timeout_secs = timeout.as_secs(), "명령 시간 초과");
                Ok(CommandOutput::timed_out(timeout))
            }
            Ok(Ok(output)) => Ok(output),
            Ok(Err(BollardError::DockerResponseServerError { message, .. })) => Ok(daemon_failure(message)),
            Ok(Err(e)) => Err(DockerError::ApiError {
                source: e,
                context: format!("컨테이너 {} 명령 실행", container),
            }),
        }
    }

    async fn remove_container(&self, name: &str) -> Result<bool, DockerError> {
        let options = Some(RemoveContainerOptions {
            force: true,
            ..Default::default()
        });

        match self.0.remove_container(name, options).await {
            Ok(()) => Ok(true),
            // --rm 으로 만든 컨테이너는 이미 삭제가 진행 중일 수 있음
            Err(BollardError::DockerResponseServerError { status_code: 409, .. }) => Ok(true),
            Err(BollardError::DockerResponseServerError { status_code, message }) => {
                warn!(container = %name, status_code, error = %message, "컨테이너 삭제 실패");
                Ok(false)
            }
            Err(e) => Err(DockerError::ApiError {
                source: e,
                context: format!("컨테이너 {} 삭제", name),
            }),
        }
    }

    async fn container_exists(&self, name: &str) -> Result<bool, DockerError> {
        match self.0.inspect_container(name, None::<InspectContainerOptions>).await {
            Ok(_) => Ok(true),
            Err(BollardError::DockerResponseServerError { status_code: 404, .. }) => Ok(false),
            Err(e) => Err(DockerError::ApiError {
                source: e,
                context: format!("컨테이너 {} 조회", name),
            }),
        }
    }
}
