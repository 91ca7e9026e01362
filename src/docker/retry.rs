use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

use crate::docker::{CommandOutput, DockerClient, DockerError};
use crate::settings::RetrySettings;

/// 재시도 정책
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 최대 시도 횟수
    pub max_attempts: u32,
    /// 시도 한 번의 시간 제한
    pub attempt_timeout: Duration,
    /// 재시도 간격
    pub interval: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
    pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(900);

    pub fn new(max_attempts: u32, attempt_timeout: Duration) -> Self {
        Self {
            max_attempts,
            attempt_timeout,
            interval: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_ATTEMPT_TIMEOUT)
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            attempt_timeout: Duration::from_secs(settings.attempt_timeout),
            interval: Duration::from_secs(settings.interval),
        }
    }
}

/// 재시도 가능한 작업 특성
#[async_trait]
pub trait RetryableOperation {
    type Output;

    /// 작업 실행
    async fn execute(&self) -> Result<Self::Output, DockerError>;

    /// 결과가 기대값을 만족하는지
    fn is_satisfied(&self, output: &Self::Output) -> bool;
}

/// 재시도 로직 실행
///
/// 만족하는 첫 결과에서 멈추고, 끝까지 만족하지 않으면 마지막 시도 결과를
/// 돌려줍니다. `execute` 가 `Err` 를 내면 재시도하지 않고 바로 전파합니다.
pub async fn with_retry<T: RetryableOperation + Sync>(
    operation: T,
    policy: &RetryPolicy,
) -> Result<T::Output, DockerError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;
        let output = match operation.execute().await {
            Ok(output) => output,
            Err(e) => {
                error!(
                    error = %e,
                    attempt = attempts,
                    "명령 호출 실패, 재시도하지 않음"
                );
                return Err(e);
            }
        };

        if operation.is_satisfied(&output) {
            return Ok(output);
        }

        if attempts >= max_attempts {
            return Ok(output);
        }

        warn!(
            attempt = attempts,
            max_attempts = max_attempts,
            "기대한 결과가 아님, 재시도 예정"
        );

        if !policy.interval.is_zero() {
            sleep(policy.interval).await;
        }
    }
}

/// 컨테이너 안의 명령 한 번
pub struct ContainerCommandRetry<'a> {
    pub client: &'a dyn DockerClient,
    pub container: &'a str,
    pub command: &'a [String],
    pub expected_exit_code: i64,
    pub timeout: Duration,
}

#[async_trait]
impl<'a> RetryableOperation for ContainerCommandRetry<'a> {
    type Output = CommandOutput;

    async fn execute(&self) -> Result<Self::Output, DockerError> {
        let output = self
            .client
            .exec_in_container(self.timeout, self.container, self.command)
            .await?;
        debug!(
            container = %self.container,
            command = ?self.command,
            exit_code = output.exit_code,
            "명령 시도 완료"
        );
        Ok(output)
    }

    fn is_satisfied(&self, output: &Self::Output) -> bool {
        output.exit_code == self.expected_exit_code
    }
}

/// 기대한 종료 코드가 나올 때까지 컨테이너 명령을 반복 실행
pub struct RetryingExecutor<'a> {
    client: &'a dyn DockerClient,
    policy: RetryPolicy,
}

impl<'a> RetryingExecutor<'a> {
    pub fn new(client: &'a dyn DockerClient, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// 첫 번째로 일치한 종료 코드, 또는 마지막 시도의 종료 코드를 반환합니다.
    pub async fn run(
        &self,
        container: &str,
        command: &[String],
        expected_exit_code: i64,
    ) -> Result<i64, DockerError> {
        let operation = ContainerCommandRetry {
            client: self.client,
            container,
            command,
            expected_exit_code,
            timeout: self.policy.attempt_timeout,
        };

        let output = with_retry(operation, &self.policy).await?;
        if output.exit_code == expected_exit_code {
            info!(container = %container, command = ?command, "명령 성공");
        } else {
            warn!(
                container = %container,
                command = ?command,
                exit_code = output.exit_code,
                expected = expected_exit_code,
                output = %output.combined().trim(),
                "재시도 횟수 소진"
            );
        }
        Ok(output.exit_code)
    }
}
