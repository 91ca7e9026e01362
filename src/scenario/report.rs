use tracing::{error, info, warn};

use super::ScenarioOutcome;

#[derive(Debug)]
pub struct ScenarioResult {
    pub name: String,
    pub outcome: ScenarioOutcome,
    /// 삭제 후에도 남아 있는 컨테이너
    pub leaked: Option<String>,
}

/// 전체 실행 결과
#[derive(Debug, Default)]
pub struct RunReport {
    pub results: Vec<ScenarioResult>,
}

impl RunReport {
    pub fn push(&mut self, result: ScenarioResult) {
        self.results.push(result);
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_passed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_failed()).count()
    }

    pub fn leaked_containers(&self) -> Vec<&str> {
        self.results.iter().filter_map(|r| r.leaked.as_deref()).collect()
    }

    /// 실패한 시나리오가 하나도 없으면 성공
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn log_summary(&self) {
        for result in &self.results {
            match &result.outcome {
                ScenarioOutcome::Passed => info!(scenario = %result.name, "통과"),
                ScenarioOutcome::Skipped { reason } => warn!(scenario = %result.name, reason = %reason, "건너뜀"),
                ScenarioOutcome::Failed(failure) => error!(scenario = %result.name, error = %failure, "실패"),
            }
            if let Some(container) = &result.leaked {
                error!(scenario = %result.name, container = %container, "정리되지 않은 컨테이너");
            }
        }

        info!(
            passed = self.passed(),
            skipped = self.skipped(),
            failed = self.failed(),
            leaked = self.leaked_containers().len(),
            "패키지 관리자 업데이트 검사 완료"
        );
    }
}
