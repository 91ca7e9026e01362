//! 배포판별 패키지 관리자 업데이트 시나리오

mod report;
mod runner;

pub use report::{RunReport, ScenarioResult};
pub use runner::{ScenarioFailure, ScenarioOutcome, ScenarioRunner};

use std::path::PathBuf;

use crate::host::{HostInfo, VersionComparison};
use crate::settings::ImageSettings;

/// 패키지 관리자 명령 하나와 기대 종료 코드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCommand {
    pub argv: Vec<String>,
    pub expected_exit_code: i64,
}

impl PackageCommand {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            expected_exit_code: 0,
        }
    }

    pub fn display(&self) -> String {
        self.argv.join(" ")
    }
}

/// 특정 호스트에서 시나리오를 건너뛰는 조건
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipRule {
    pub distro_id: String,
    pub min_version_id: String,
    pub reason: String,
}

impl SkipRule {
    /// 호스트 ID 가 같고 버전이 기준 이상이면 적용
    pub fn applies(&self, host: &HostInfo, comparison: VersionComparison) -> bool {
        host.id == self.distro_id && comparison.at_least(&host.version_id, &self.min_version_id)
    }

    /// RHEL 8 이상 호스트에서 dnf/yum 이 실패하는 문제
    pub fn rhel8_package_manager() -> Self {
        Self {
            distro_id: "rhel".to_string(),
            min_version_id: "8".to_string(),
            reason: "Issue:https://github.com/kata-containers/runtime/issues/2580".to_string(),
        }
    }
}

/// 배포판 하나의 업데이트 시나리오 (생성 후 변경하지 않음)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub image: String,
    /// 컨테이너 종료 시 자동 삭제 (`--rm`)
    pub auto_remove: bool,
    pub commands: Vec<PackageCommand>,
    /// 프록시를 직접 적어줘야 하는 패키지 관리자 설정 파일
    pub proxy_config: Option<PathBuf>,
    pub skip: Option<SkipRule>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            auto_remove: false,
            commands: Vec::new(),
            proxy_config: None,
            skip: None,
        }
    }

    pub fn with_command(mut self, command: PackageCommand) -> Self {
        self.commands.push(command);
        self
    }

    pub fn with_auto_remove(mut self) -> Self {
        self.auto_remove = true;
        self
    }

    pub fn with_proxy_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.proxy_config = Some(path.into());
        self
    }

    pub fn with_skip(mut self, rule: SkipRule) -> Self {
        self.skip = Some(rule);
        self
    }

    /// 호스트에서 건너뛰어야 하면 그 이유
    pub fn skip_reason(&self, host: &HostInfo, comparison: VersionComparison) -> Option<&str> {
        self.skip
            .as_ref()
            .filter(|rule| rule.applies(host, comparison))
            .map(|rule| rule.reason.as_str())
    }

    pub fn apt_get(image: impl Into<String>) -> Self {
        Self::new("apt-get update and upgrade", image)
            .with_command(PackageCommand::new(["apt-get", "-y", "update"]))
            .with_command(PackageCommand::new(["apt-get", "-y", "upgrade"]))
    }

    pub fn dnf(image: impl Into<String>) -> Self {
        // dnf 는 환경 변수의 프록시를 읽지 않음
        Self::new("dnf update", image)
            .with_proxy_config("/etc/dnf/dnf.conf")
            .with_command(PackageCommand::new(["dnf", "-y", "update"]))
            .with_skip(SkipRule::rhel8_package_manager())
    }

    pub fn yum(image: impl Into<String>) -> Self {
        Self::new("yum update", image)
            .with_auto_remove()
            .with_command(PackageCommand::new(["yum", "-y", "update"]))
            .with_skip(SkipRule::rhel8_package_manager())
    }
}

/// 지원하는 배포판 시나리오 목록
pub fn default_scenarios(images: &ImageSettings) -> Vec<Scenario> {
    vec![
        Scenario::apt_get(images.debian.clone()),
        Scenario::dnf(images.fedora.clone()),
        Scenario::yum(images.centos.clone()),
    ]
}
