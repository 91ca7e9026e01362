use pkg_upgrade_check::{
    docker::{self, RetryPolicy},
    host::HostInfo,
    logging,
    proxy::ProxyConfigurator,
    scenario::{default_scenarios, ScenarioRunner},
    settings::Settings,
};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // 설정 로드
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("설정 로드 실패: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // 로깅 초기화
    let _guard = logging::init_logging(&settings.logging);

    let client = match docker::connect(&settings.docker) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Docker 클라이언트 초기화 실패");
            return ExitCode::FAILURE;
        }
    };

    let policy = RetryPolicy::from(&settings.retry);
    info!(
        max_attempts = policy.max_attempts,
        attempt_timeout_secs = policy.attempt_timeout.as_secs(),
        "패키지 관리자 업데이트 검사 시작"
    );

    let runner = ScenarioRunner::new(client, policy)
        .with_proxy(ProxyConfigurator::from_env())
        .with_host(HostInfo::detect(), settings.scenarios.version_comparison);

    let scenarios = default_scenarios(&settings.scenarios.images);
    let report = runner.run_all(&scenarios).await;
    report.log_summary();

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
