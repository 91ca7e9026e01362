#![allow(dead_code)]

use async_trait::async_trait;
use pkg_upgrade_check::docker::{CommandOutput, ContainerHandle, DockerClient, DockerError};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// 명령 한 번에 대한 모의 응답
#[derive(Debug, Clone, Copy)]
pub enum MockExec {
    Exit(i64),
    /// docker 프로세스를 띄우지 못한 상황
    InvocationFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecCall {
    pub timeout: Duration,
    pub container: String,
    pub command: Vec<String>,
}

#[derive(Default)]
struct MockState {
    created: Vec<ContainerHandle>,
    running: HashSet<String>,
    exec_calls: Vec<ExecCall>,
    exec_script: HashMap<String, VecDeque<MockExec>>,
    create_exit_code: i64,
    remove_fails: bool,
    leak_on_remove: bool,
    removed: Vec<String>,
    name_counter: usize,
}

// Mock Docker Client
#[derive(Clone, Default)]
pub struct MockDockerClient {
    state: Arc<Mutex<MockState>>,
}

impl MockDockerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 명령(공백으로 이은 argv)에 대한 응답 순서를 지정합니다. 소진되면 0.
    pub async fn script(&self, command: &[String], responses: impl IntoIterator<Item = MockExec>) {
        let mut state = self.state.lock().await;
        state
            .exec_script
            .entry(command.join(" "))
            .or_default()
            .extend(responses);
    }

    pub async fn script_exit_codes(&self, command: &[&str], codes: impl IntoIterator<Item = i64>) {
        let command: Vec<String> = command.iter().map(|s| s.to_string()).collect();
        self.script(&command, codes.into_iter().map(MockExec::Exit)).await;
    }

    pub async fn fail_create_with(&self, exit_code: i64) {
        self.state.lock().await.create_exit_code = exit_code;
    }

    pub async fn fail_remove(&self) {
        self.state.lock().await.remove_fails = true;
    }

    /// 삭제는 성공했다고 답하지만 컨테이너는 남겨 둡니다.
    pub async fn leak_on_remove(&self) {
        self.state.lock().await.leak_on_remove = true;
    }

    pub async fn exec_calls(&self) -> Vec<ExecCall> {
        self.state.lock().await.exec_calls.clone()
    }

    pub async fn exec_commands(&self) -> Vec<String> {
        self.exec_calls()
            .await
            .into_iter()
            .map(|call| call.command.join(" "))
            .collect()
    }

    pub async fn created(&self) -> Vec<ContainerHandle> {
        self.state.lock().await.created.clone()
    }

    pub async fn removed(&self) -> Vec<String> {
        self.state.lock().await.removed.clone()
    }

    pub async fn running(&self) -> HashSet<String> {
        self.state.lock().await.running.clone()
    }
}

fn invocation_error(context: &str) -> DockerError {
    DockerError::InvocationError {
        program: "docker".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "docker not found"),
        context: context.to_string(),
    }
}

#[async_trait]
impl DockerClient for MockDockerClient {
    async fn create_container(&self, handle: &ContainerHandle) -> Result<CommandOutput, DockerError> {
        let mut state = self.state.lock().await;
        state.created.push(handle.clone());
        if state.create_exit_code != 0 {
            return Ok(CommandOutput {
                stdout: String::new(),
                stderr: "Unable to find image".to_string(),
                exit_code: state.create_exit_code,
            });
        }
        state.running.insert(handle.name.clone());
        Ok(CommandOutput::with_exit_code(0))
    }

    async fn exec_in_container(
        &self,
        timeout: Duration,
        container: &str,
        command: &[String],
    ) -> Result<CommandOutput, DockerError> {
        let mut state = self.state.lock().await;
        state.exec_calls.push(ExecCall {
            timeout,
            container: container.to_string(),
            command: command.to_vec(),
        });

        let response = state
            .exec_script
            .get_mut(&command.join(" "))
            .and_then(VecDeque::pop_front)
            .unwrap_or(MockExec::Exit(0));

        match response {
            MockExec::Exit(code) => Ok(CommandOutput::with_exit_code(code)),
            MockExec::InvocationFailure => Err(invocation_error("exec")),
        }
    }

    async fn remove_container(&self, name: &str) -> Result<bool, DockerError> {
        let mut state = self.state.lock().await;
        if state.remove_fails {
            return Ok(false);
        }
        if state.leak_on_remove {
            state.removed.push(name.to_string());
            return Ok(true);
        }
        let removed = state.running.remove(name);
        if removed {
            state.removed.push(name.to_string());
        }
        Ok(removed)
    }

    async fn container_exists(&self, name: &str) -> Result<bool, DockerError> {
        Ok(self.state.lock().await.running.contains(name))
    }

    fn random_name(&self) -> String {
        // 동기 함수라 try_lock 사용, 테스트에서는 경합이 없음
        match self.state.try_lock() {
            Ok(mut state) => {
                state.name_counter += 1;
                format!("pkgcheck-test-{}", state.name_counter)
            }
            Err(_) => pkg_upgrade_check::docker::random_container_name(),
        }
    }
}

pub fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}
