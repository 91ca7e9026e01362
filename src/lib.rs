//! 여러 배포판 컨테이너 안에서 패키지 관리자 업데이트가 제대로 동작하는지 검사합니다.
//!
//! # 주요 기능
//!
//! - 기대한 종료 코드가 나올 때까지 컨테이너 명령 재시도 (시도 횟수와 시간 제한 고정)
//! - 호스트 `http_proxy` 를 컨테이너와 패키지 관리자 설정에 전달
//! - 호스트 OS 버전에 따른 시나리오 건너뛰기
//! - 시나리오마다 컨테이너 생성, 삭제, 삭제 확인
//!
//! # 예제
//!
//! ```no_run
//! use pkg_upgrade_check::docker::{CliDockerClient, RetryPolicy};
//! use pkg_upgrade_check::host::HostInfo;
//! use pkg_upgrade_check::proxy::ProxyConfigurator;
//! use pkg_upgrade_check::scenario::{default_scenarios, ScenarioRunner};
//! use pkg_upgrade_check::settings::ImageSettings;
//!
//! # async fn run() {
//! let runner = ScenarioRunner::new(Box::new(CliDockerClient::default()), RetryPolicy::default())
//!     .with_proxy(ProxyConfigurator::from_env())
//!     .with_host(HostInfo::detect(), Default::default());
//!
//! let report = runner.run_all(&default_scenarios(&ImageSettings::default())).await;
//! assert!(report.is_success());
//! # }
//! ```

pub mod docker;
pub mod host;
pub mod logging;
pub mod proxy;
pub mod scenario;
pub mod settings;
