use std::fmt;
use tracing::{error, info, info_span, warn, Instrument};

use super::{RunReport, Scenario, ScenarioResult};
use crate::docker::{ContainerHandle, DockerClient, DockerError, RetryPolicy, RetryingExecutor};
use crate::host::{HostInfo, VersionComparison};
use crate::proxy::ProxyConfigurator;

/// 시나리오 실패 원인
#[derive(Debug)]
pub enum ScenarioFailure {
    /// 컨테이너 생성 명령이 0이 아닌 코드로 끝남
    CreateFailed {
        exit_code: i64,
        stderr: String,
    },
    /// 패키지 관리자 프록시 설정 실패
    ProxyConfigFailed {
        exit_code: i64,
    },
    /// 재시도 후에도 기대한 종료 코드가 나오지 않음
    CommandFailed {
        command: String,
        expected: i64,
        actual: i64,
    },
    /// 컨테이너 삭제 요청 실패
    RemoveFailed {
        container: String,
    },
    /// 삭제 후에도 컨테이너가 남아 있음
    ContainerLeaked {
        container: String,
    },
    /// 컨테이너 런타임 호출 자체가 실패
    Collaborator(DockerError),
}

impl fmt::Display for ScenarioFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateFailed { exit_code, stderr } =>
                write!(f, "컨테이너 생성 실패 (종료 코드 {}): {}", exit_code, stderr.trim()),
            Self::ProxyConfigFailed { exit_code } =>
                write!(f, "프록시 설정 실패 (종료 코드 {})", exit_code),
            Self::CommandFailed { command, expected, actual } =>
                write!(f, "'{}' 실패: 기대 종료 코드 {}, 실제 {}", command, expected, actual),
            Self::RemoveFailed { container } =>
                write!(f, "컨테이너 {} 삭제 실패", container),
            Self::ContainerLeaked { container } =>
                write!(f, "컨테이너 {} 가 삭제 후에도 남아 있음", container),
            Self::Collaborator(e) =>
                write!(f, "컨테이너 런타임 호출 실패: {}", e),
        }
    }
}

impl std::error::Error for ScenarioFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Collaborator(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DockerError> for ScenarioFailure {
    fn from(err: DockerError) -> Self {
        ScenarioFailure::Collaborator(err)
    }
}

#[derive(Debug)]
pub enum ScenarioOutcome {
    Passed,
    Skipped { reason: String },
    Failed(ScenarioFailure),
}

impl ScenarioOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, ScenarioOutcome::Passed)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ScenarioOutcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ScenarioOutcome::Failed(_))
    }

    pub fn failure(&self) -> Option<&ScenarioFailure> {
        match self {
            ScenarioOutcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// 시나리오 하나를 처음부터 끝까지 실행
///
/// 컨테이너 생성, 프록시 설정, 명령 재시도, 삭제와 삭제 확인까지 담당합니다.
/// 시나리오는 항상 하나씩 순서대로 실행됩니다.
pub struct ScenarioRunner {
    client: Box<dyn DockerClient>,
    policy: RetryPolicy,
    proxy: ProxyConfigurator,
    host: HostInfo,
    comparison: VersionComparison,
}

impl ScenarioRunner {
    pub fn new(client: Box<dyn DockerClient>, policy: RetryPolicy) -> Self {
        Self {
            client,
            policy,
            proxy: ProxyConfigurator::default(),
            host: HostInfo::default(),
            comparison: VersionComparison::default(),
        }
    }

    pub fn with_proxy(mut self, proxy: ProxyConfigurator) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_host(mut self, host: HostInfo, comparison: VersionComparison) -> Self {
        self.host = host;
        self.comparison = comparison;
        self
    }

    pub fn client(&self) -> &dyn DockerClient {
        self.client.as_ref()
    }

    /// 모든 시나리오를 순서대로 실행합니다. 한 시나리오의 실패는 다음 시나리오에 영향이 없습니다.
    pub async fn run_all(&self, scenarios: &[Scenario]) -> RunReport {
        let mut report = RunReport::default();
        for scenario in scenarios {
            let result = self
                .run_result(scenario)
                .instrument(info_span!("scenario", name = %scenario.name, image = %scenario.image))
                .await;
            report.push(result);
        }
        report
    }

    pub async fn run(&self, scenario: &Scenario) -> ScenarioOutcome {
        self.run_result(scenario).await.outcome
    }

    /// 시나리오 결과와 함께, 삭제 후에도 남은 컨테이너 이름을 돌려줍니다.
    pub async fn run_result(&self, scenario: &Scenario) -> ScenarioResult {
        let (outcome, leaked) = self.execute(scenario).await;
        ScenarioResult {
            name: scenario.name.clone(),
            outcome,
            leaked,
        }
    }

    async fn execute(&self, scenario: &Scenario) -> (ScenarioOutcome, Option<String>) {
        if let Some(reason) = scenario.skip_reason(&self.host, self.comparison) {
            info!(
                host_id = %self.host.id,
                host_version = %self.host.version_id,
                reason = %reason,
                "시나리오 건너뜀"
            );
            return (ScenarioOutcome::Skipped { reason: reason.to_string() }, None);
        }

        let handle = self.proxy.decorate(
            ContainerHandle::new(self.client.random_name(), scenario.image.clone())
                .with_auto_remove(scenario.auto_remove),
        );
        info!(container = %handle.name, args = ?handle.creation_args(), "시나리오 시작");

        let result = self.drive(scenario, &handle).await;
        let (result, leaked) = self.teardown(&handle.name, result).await;

        let outcome = match result {
            Ok(()) => {
                info!(container = %handle.name, "시나리오 성공");
                ScenarioOutcome::Passed
            }
            Err(failure) => {
                error!(container = %handle.name, error = %failure, "시나리오 실패");
                ScenarioOutcome::Failed(failure)
            }
        };
        (outcome, leaked)
    }

    async fn drive(&self, scenario: &Scenario, handle: &ContainerHandle) -> Result<(), ScenarioFailure> {
        let created = self.client.create_container(handle).await?;
        if !created.success() {
            return Err(ScenarioFailure::CreateFailed {
                exit_code: created.exit_code,
                stderr: created.stderr,
            });
        }

        if let Some(config_file) = &scenario.proxy_config {
            let applied = self
                .proxy
                .apply(self.client.as_ref(), self.policy.attempt_timeout, &handle.name, config_file)
                .await?;
            if let Some(exit_code) = applied.filter(|code| *code != 0) {
                return Err(ScenarioFailure::ProxyConfigFailed { exit_code });
            }
        }

        let executor = RetryingExecutor::new(self.client.as_ref(), self.policy.clone());
        for command in &scenario.commands {
            let exit_code = executor
                .run(&handle.name, &command.argv, command.expected_exit_code)
                .await?;
            if exit_code != command.expected_exit_code {
                return Err(ScenarioFailure::CommandFailed {
                    command: command.display(),
                    expected: command.expected_exit_code,
                    actual: exit_code,
                });
            }
        }

        Ok(())
    }

    /// 결과와 상관없이 컨테이너를 지우고, 없어졌는지 확인합니다.
    ///
    /// 먼저 난 실패가 있으면 그 실패를 유지하고, 남은 컨테이너 이름은 따로 돌려줍니다.
    async fn teardown(
        &self,
        name: &str,
        result: Result<(), ScenarioFailure>,
    ) -> (Result<(), ScenarioFailure>, Option<String>) {
        let removed = self.client.remove_container(name).await;
        let exists = self.client.container_exists(name).await;
        let leaked = matches!(exists, Ok(true)).then(|| name.to_string());

        if let Err(failure) = result {
            match exists {
                Ok(false) => {}
                Ok(true) => error!(container = %name, "실패한 시나리오의 컨테이너가 남아 있음"),
                Err(e) => warn!(container = %name, error = %e, "컨테이너 존재 여부 확인 실패"),
            }
            return (Err(failure), leaked);
        }

        let result = match (removed, exists) {
            (Err(e), _) | (_, Err(e)) => Err(ScenarioFailure::from(e)),
            (Ok(false), _) => Err(ScenarioFailure::RemoveFailed { container: name.to_string() }),
            (Ok(true), Ok(true)) => Err(ScenarioFailure::ContainerLeaked { container: name.to_string() }),
            (Ok(true), Ok(false)) => Ok(()),
        };
        (result, leaked)
    }
}
