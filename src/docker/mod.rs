mod bollard_client;
mod cli_client;
mod client;
mod container;
mod error_types;
mod retry;

pub use bollard_client::BollardDockerClient;
pub use cli_client::CliDockerClient;
pub use client::{
    random_container_name, CommandOutput, DockerClient, DAEMON_ERROR_EXIT_CODE, TIMEOUT_EXIT_CODE,
};
pub use container::ContainerHandle;
pub use error_types::DockerError;
pub use retry::{with_retry, ContainerCommandRetry, RetryPolicy, RetryableOperation, RetryingExecutor};

use crate::settings::{DockerBackend, DockerSettings};
use tracing::info;

/// 설정된 백엔드에 맞는 Docker 클라이언트를 만듭니다.
pub fn connect(settings: &DockerSettings) -> Result<Box<dyn DockerClient>, DockerError> {
    match settings.backend {
        DockerBackend::Api => {
            info!("Docker Engine API 백엔드 사용");
            Ok(Box::new(BollardDockerClient::connect_local()?))
        }
        DockerBackend::Cli => {
            info!(binary = %settings.binary, "docker CLI 백엔드 사용");
            Ok(Box::new(CliDockerClient::new(settings.binary.clone())))
        }
    }
}
