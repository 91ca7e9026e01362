mod common;

use common::{argv, MockDockerClient, MockExec};
use pkg_upgrade_check::docker::RetryPolicy;
use pkg_upgrade_check::host::{HostInfo, VersionComparison};
use pkg_upgrade_check::proxy::{ProxyConfigurator, ProxySetting};
use pkg_upgrade_check::scenario::{
    default_scenarios, Scenario, ScenarioFailure, ScenarioOutcome, ScenarioRunner,
};
use pkg_upgrade_check::settings::ImageSettings;
use std::path::Path;

fn runner(client: &MockDockerClient) -> ScenarioRunner {
    ScenarioRunner::new(Box::new(client.clone()), RetryPolicy::default())
}

#[tokio::test]
async fn test_apt_get_scenario_end_to_end() {
    let client = MockDockerClient::new();
    let outcome = runner(&client).run(&Scenario::apt_get("debian")).await;

    assert!(outcome.is_passed(), "{:?}", outcome);

    let created = client.created().await;
    assert_eq!(created.len(), 1);
    let name = created[0].name.clone();
    assert_eq!(
        created[0].creation_args(),
        argv(&["-td", "--name", name.as_str(), "debian", "sh"])
    );

    assert_eq!(
        client.exec_commands().await,
        vec!["apt-get -y update", "apt-get -y upgrade"]
    );
    assert_eq!(client.removed().await, vec![name.clone()]);
    assert!(!client.running().await.contains(&name));
}

#[tokio::test]
async fn test_yum_scenario_uses_auto_remove() {
    let client = MockDockerClient::new();
    let outcome = runner(&client).run(&Scenario::yum("centos")).await;

    assert!(outcome.is_passed());
    let created = client.created().await;
    assert_eq!(created[0].creation_args()[0], "--rm");
}

#[tokio::test]
async fn test_proxy_is_propagated_to_dnf() {
    let client = MockDockerClient::new();
    let proxy = ProxySetting::new("http://proxy.example:3128").unwrap();
    let runner = runner(&client).with_proxy(ProxyConfigurator::new(Some(proxy.clone())));

    let outcome = runner.run(&Scenario::dnf("fedora:30")).await;
    assert!(outcome.is_passed(), "{:?}", outcome);

    let created = client.created().await;
    let args = created[0].creation_args();
    assert_eq!(args[..2].join(" "), "-e http_proxy=http://proxy.example:3128");

    let edit = proxy.config_edit_command(Path::new("/etc/dnf/dnf.conf")).join(" ");
    assert_eq!(client.exec_commands().await, vec![edit, "dnf -y update".to_string()]);
}

#[tokio::test]
async fn test_proxy_edit_skipped_for_apt_get() {
    let client = MockDockerClient::new();
    let proxy = ProxySetting::new("http://proxy.example:3128");
    let runner = runner(&client).with_proxy(ProxyConfigurator::new(proxy));

    let outcome = runner.run(&Scenario::apt_get("debian")).await;
    assert!(outcome.is_passed());

    // apt 는 환경 변수만으로 충분
    assert_eq!(client.created().await[0].env, vec!["http_proxy=http://proxy.example:3128"]);
    assert_eq!(
        client.exec_commands().await,
        vec!["apt-get -y update", "apt-get -y upgrade"]
    );
}

#[tokio::test]
async fn test_no_proxy_means_no_edit() {
    let client = MockDockerClient::new();
    let outcome = runner(&client).run(&Scenario::dnf("fedora:30")).await;

    assert!(outcome.is_passed());
    assert!(client.created().await[0].env.is_empty());
    assert_eq!(client.exec_commands().await, vec!["dnf -y update"]);
}

#[tokio::test]
async fn test_proxy_edit_failure_fails_scenario() {
    let client = MockDockerClient::new();
    let proxy = ProxySetting::new("http://p:1").unwrap();
    let edit = proxy.config_edit_command(Path::new("/etc/dnf/dnf.conf"));
    client.script(&edit, [MockExec::Exit(2)]).await;

    let runner = runner(&client).with_proxy(ProxyConfigurator::new(Some(proxy)));
    let outcome = runner.run(&Scenario::dnf("fedora:30")).await;

    assert!(matches!(
        outcome.failure(),
        Some(ScenarioFailure::ProxyConfigFailed { exit_code: 2 })
    ));
    // dnf 는 실행되지 않음
    assert_eq!(client.exec_calls().await.len(), 1);
    assert!(client.running().await.is_empty());
}

#[tokio::test]
async fn test_persistent_failure_reports_last_code_and_cleans_up() {
    let client = MockDockerClient::new();
    client
        .script_exit_codes(&["apt-get", "-y", "update"], [100, 100, 100, 100, 101])
        .await;

    let outcome = runner(&client).run(&Scenario::apt_get("debian")).await;

    match outcome.failure() {
        Some(ScenarioFailure::CommandFailed { command, expected, actual }) => {
            assert_eq!(command, "apt-get -y update");
            assert_eq!(*expected, 0);
            assert_eq!(*actual, 101);
        }
        other => panic!("CommandFailed 가 와야 함: {:?}", other),
    }

    // upgrade 는 실행되지 않음
    assert_eq!(client.exec_calls().await.len(), 5);
    assert_eq!(client.removed().await.len(), 1);
    assert!(client.running().await.is_empty());
}

#[tokio::test]
async fn test_failure_does_not_stop_other_scenarios() {
    let client = MockDockerClient::new();
    client.script_exit_codes(&["dnf", "-y", "update"], [1, 1, 1, 1, 1]).await;

    let report = runner(&client)
        .run_all(&default_scenarios(&ImageSettings::default()))
        .await;

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.passed(), 2);
    assert_eq!(report.failed(), 1);
    assert!(!report.is_success());
    assert!(report.results[1].outcome.is_failed());

    // 시나리오마다 다른 컨테이너
    let created = client.created().await;
    assert_eq!(created.len(), 3);
    assert_ne!(created[0].name, created[1].name);
    assert_ne!(created[1].name, created[2].name);
    assert!(client.running().await.is_empty());
}

#[tokio::test]
async fn test_rhel8_host_skips_dnf_and_yum() {
    let client = MockDockerClient::new();
    let runner = runner(&client).with_host(HostInfo::new("rhel", "8"), VersionComparison::Lexicographic);

    let report = runner.run_all(&default_scenarios(&ImageSettings::default())).await;

    assert!(report.results[0].outcome.is_passed());
    assert!(report.results[1].outcome.is_skipped());
    assert!(report.results[2].outcome.is_skipped());
    assert!(report.is_success());

    // 건너뛴 시나리오는 컨테이너를 만들지 않음
    let created = client.created().await;
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].image, "debian");

    if let ScenarioOutcome::Skipped { reason } = &report.results[1].outcome {
        assert!(reason.contains("issues/2580"));
    }
}

#[tokio::test]
async fn test_rhel7_host_runs_dnf_and_yum() {
    let client = MockDockerClient::new();
    let runner = runner(&client).with_host(HostInfo::new("rhel", "7"), VersionComparison::Lexicographic);

    let report = runner.run_all(&default_scenarios(&ImageSettings::default())).await;

    assert_eq!(report.passed(), 3);
    assert_eq!(report.skipped(), 0);
}

#[tokio::test]
async fn test_create_failure() {
    let client = MockDockerClient::new();
    client.fail_create_with(125).await;

    let outcome = runner(&client).run(&Scenario::apt_get("no-such-image")).await;

    assert!(matches!(
        outcome.failure(),
        Some(ScenarioFailure::CreateFailed { exit_code: 125, .. })
    ));
    assert!(client.exec_calls().await.is_empty());
}

#[tokio::test]
async fn test_remove_failure_is_reported() {
    let client = MockDockerClient::new();
    client.fail_remove().await;

    let outcome = runner(&client).run(&Scenario::apt_get("debian")).await;

    assert!(matches!(outcome.failure(), Some(ScenarioFailure::RemoveFailed { .. })));
}

#[tokio::test]
async fn test_invocation_error_fails_scenario_and_cleans_up() {
    let client = MockDockerClient::new();
    client
        .script(&argv(&["apt-get", "-y", "update"]), [MockExec::InvocationFailure])
        .await;

    let outcome = runner(&client).run(&Scenario::apt_get("debian")).await;

    assert!(matches!(outcome.failure(), Some(ScenarioFailure::Collaborator(_))));
    assert_eq!(client.exec_calls().await.len(), 1);
    assert!(client.running().await.is_empty());
}

#[tokio::test]
async fn test_container_surviving_removal_is_reported() {
    let client = MockDockerClient::new();
    client.leak_on_remove().await;

    let result = runner(&client).run_result(&Scenario::apt_get("debian")).await;

    let name = client.created().await[0].name.clone();
    match result.outcome.failure() {
        Some(ScenarioFailure::ContainerLeaked { container }) => assert_eq!(container, &name),
        other => panic!("ContainerLeaked 가 와야 함: {:?}", other),
    }
    assert_eq!(result.leaked.as_deref(), Some(name.as_str()));
    assert_eq!(client.removed().await, vec![name.clone()]);
    assert!(client.running().await.contains(&name));
}

#[tokio::test]
async fn test_leak_after_command_failure_keeps_command_failure() {
    let client = MockDockerClient::new();
    client.leak_on_remove().await;
    client
        .script_exit_codes(&["apt-get", "-y", "update"], [1, 1, 1, 1, 1])
        .await;

    let result = runner(&client).run_result(&Scenario::apt_get("debian")).await;

    assert!(matches!(
        result.outcome.failure(),
        Some(ScenarioFailure::CommandFailed { actual: 1, .. })
    ));
    let name = client.created().await[0].name.clone();
    assert_eq!(result.leaked, Some(name));
}

#[tokio::test]
async fn test_report_lists_leaked_containers() {
    let client = MockDockerClient::new();
    client.leak_on_remove().await;
    let runner = runner(&client).with_host(HostInfo::new("rhel", "8"), VersionComparison::Lexicographic);

    let report = runner.run_all(&default_scenarios(&ImageSettings::default())).await;

    // 건너뛴 시나리오는 컨테이너가 없으므로 잔존 목록에도 없음
    let created = client.created().await;
    assert_eq!(report.leaked_containers(), vec![created[0].name.as_str()]);
    assert_eq!(report.failed(), 1);
    assert!(report.results[1].leaked.is_none());
}

#[tokio::test]
async fn test_clean_run_has_no_leaks() {
    let client = MockDockerClient::new();
    let report = runner(&client)
        .run_all(&default_scenarios(&ImageSettings::default()))
        .await;

    assert!(report.is_success());
    assert!(report.leaked_containers().is_empty());
}
