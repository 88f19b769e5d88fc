// ABOUTME: Test for session name consistency between runs and across modules
// Verifies that tmux session names derive deterministically from the namespace

use devplexer::config::Topology;
use devplexer::models::{sanitize_tmux_name, SessionId};
use devplexer::session::StatusReport;

#[test]
fn test_session_id_is_stable_across_runs() {
    let namespaces = ["demo", "my-project", "web.api", "feature/branch:name"];
    for namespace in namespaces {
        assert_eq!(
            SessionId::derive(namespace).unwrap(),
            SessionId::derive(namespace).unwrap(),
            "Session id for {namespace} should not change between runs"
        );
    }
}

#[test]
fn test_session_id_has_no_tmux_target_syntax() {
    let id = SessionId::derive("feat/branch:with<many>\"chars\".v2").unwrap();
    let problematic_chars = ['/', '\\', ':', ';', '|', '&', '(', ')', '<', '>', '"', '\'', '.'];
    for ch in problematic_chars {
        assert!(!id.as_str().contains(ch), "Character '{}' should be replaced", ch);
    }
    assert!(id
        .as_str()
        .starts_with(&sanitize_tmux_name("feat/branch:with<many>\"chars\".v2")));
}

#[test]
fn test_session_name_consistency_across_modules() {
    // Status reports and ensure runs must address the same session
    let topology =
        Topology::from_yaml_str("namespace: web.api\napps:\n  a:\n    command: ls\n", "/".as_ref())
            .unwrap();
    let derived = SessionId::derive(topology.namespace()).unwrap();
    let status = StatusReport::new(derived.clone(), false, &topology, vec![]);

    assert_eq!(status.session_id, derived);
    assert!(status.to_string().contains(derived.as_str()));
}
