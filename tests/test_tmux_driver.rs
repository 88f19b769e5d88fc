// ABOUTME: Tests for TmuxDriver against the host tmux binary
// Each test returns early when tmux is not installed

use devplexer::config::{AppSpec, Topology};
use devplexer::models::SessionId;
use devplexer::presenter::NoopPresenter;
use devplexer::session::SessionOrchestrator;
use devplexer::tmux::{MultiplexerDriver, NewWindow, TmuxDriver, TmuxError};
use tempfile::TempDir;

fn tmux_available() -> bool {
    TmuxDriver::new().check_installed().is_ok()
}

fn unique_namespace(prefix: &str) -> String {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}_{timestamp}")
}

#[test]
fn test_missing_binary_is_reported() {
    let driver = TmuxDriver::with_program("definitely-not-tmux-binary");
    assert!(matches!(
        driver.check_installed(),
        Err(TmuxError::TmuxNotInstalled)
    ));
}

#[tokio::test]
async fn test_missing_binary_makes_queries_fail() {
    let driver = TmuxDriver::with_program("definitely-not-tmux-binary");
    let session = SessionId::derive("anything").unwrap();
    let err = driver.session_exists(&session).await.unwrap_err();
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn test_create_list_and_kill_session() {
    if !tmux_available() {
        eprintln!("tmux not installed, skipping");
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let driver = TmuxDriver::new();
    let session = SessionId::derive(&unique_namespace("dpx_driver")).unwrap();

    assert!(!driver.session_exists(&session).await.unwrap());

    let first = driver
        .create_session(
            &session,
            &NewWindow {
                name: "first",
                working_directory: temp_dir.path(),
                command: "sleep 30",
            },
        )
        .await
        .unwrap();
    assert_eq!(first.name, "first");
    assert!(first.id.starts_with('@'));
    assert!(driver.session_exists(&session).await.unwrap());

    let duplicate = driver
        .create_session(
            &session,
            &NewWindow {
                name: "again",
                working_directory: temp_dir.path(),
                command: "sleep 30",
            },
        )
        .await;
    assert!(matches!(duplicate, Err(TmuxError::SessionExists(_))));

    let second = driver
        .create_window(
            &session,
            &NewWindow {
                name: "second",
                working_directory: temp_dir.path(),
                command: "echo hi",
            },
        )
        .await
        .unwrap();
    assert!(second.index > first.index);

    let names: Vec<String> = driver
        .list_windows(&session)
        .await
        .unwrap()
        .into_iter()
        .map(|w| w.name)
        .collect();
    assert_eq!(names, vec!["first", "second"]);

    driver.kill_session(&session).await.unwrap();
    assert!(!driver.session_exists(&session).await.unwrap());
    assert!(matches!(
        driver.list_windows(&session).await,
        Err(TmuxError::SessionNotFound(_))
    ));
}

#[tokio::test]
async fn test_ensure_session_against_real_tmux_is_idempotent() {
    if !tmux_available() {
        eprintln!("tmux not installed, skipping");
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let namespace = unique_namespace("dpx_e2e");
    let topology = Topology::new(
        namespace.as_str(),
        vec![
            AppSpec::new("a", temp_dir.path(), "sleep 100"),
            AppSpec::new("b", temp_dir.path(), "echo hi"),
            AppSpec::new("c", temp_dir.path(), "sleep 100"),
        ],
    )
    .unwrap();
    let orchestrator = SessionOrchestrator::new(TmuxDriver::new(), Box::new(NoopPresenter));

    let first = orchestrator.ensure_session(&topology).await.unwrap();
    let second = orchestrator.ensure_session(&topology).await.unwrap();

    assert_eq!(first.created_count(), 3);
    assert_eq!(second.created_count(), 0);
    assert_eq!(second.already_running_count(), 3);

    // remain-on-exit keeps "b" around after echo finishes
    let status = orchestrator.status(&topology).await.unwrap();
    assert!(status.missing_apps().is_empty());

    assert!(orchestrator.teardown(&topology).await.unwrap());
}

#[tokio::test]
async fn test_duplicate_window_is_closed_and_reported() {
    if !tmux_available() {
        eprintln!("tmux not installed, skipping");
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let driver = TmuxDriver::new();
    let session = SessionId::derive(&unique_namespace("dpx_dup")).unwrap();
    let window = |name: &'static str| NewWindow {
        name,
        working_directory: temp_dir.path(),
        command: "sleep 30",
    };

    driver.create_session(&session, &window("a")).await.unwrap();
    let window_left = window("b");
    let window_right = window("b");
    let (left, right) = tokio::join!(
        driver.create_window(&session, &window_left),
        driver.create_window(&session, &window_right),
    );

    let kept = [&left, &right].iter().filter(|r| r.is_ok()).count();
    let duplicate = [&left, &right]
        .iter()
        .filter(|r| matches!(r, Err(TmuxError::WindowExists(_))))
        .count();
    let names: Vec<String> = driver
        .list_windows(&session)
        .await
        .unwrap()
        .into_iter()
        .map(|w| w.name)
        .collect();
    driver.kill_session(&session).await.unwrap();

    assert_eq!((kept, duplicate), (1, 1));
    assert_eq!(names, vec!["a", "b"]);
}

#[tokio::test]
async fn test_concurrent_runs_leave_one_window_per_app() {
    if !tmux_available() {
        eprintln!("tmux not installed, skipping");
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let namespace = unique_namespace("dpx_race");
    let apps = |names: &[&str]| {
        names
            .iter()
            .map(|name| AppSpec::new(*name, temp_dir.path(), "sleep 100"))
            .collect::<Vec<_>>()
    };
    let seed = Topology::new(namespace.as_str(), apps(&["a"])).unwrap();
    let topology = Topology::new(namespace.as_str(), apps(&["a", "b", "c", "d"])).unwrap();
    let first = SessionOrchestrator::new(TmuxDriver::new(), Box::new(NoopPresenter));
    let second = SessionOrchestrator::new(TmuxDriver::new(), Box::new(NoopPresenter));
    first.ensure_session(&seed).await.unwrap();

    let (left, right) = tokio::join!(
        first.ensure_session(&topology),
        second.ensure_session(&topology)
    );
    let session = SessionId::derive(&namespace).unwrap();
    let mut names: Vec<String> = first
        .driver()
        .list_windows(&session)
        .await
        .unwrap()
        .into_iter()
        .map(|w| w.name)
        .collect();
    first.teardown(&topology).await.unwrap();

    let left = left.unwrap();
    let right = right.unwrap();
    assert_eq!(left.created_count() + right.created_count(), 3);
    names.sort();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
}
