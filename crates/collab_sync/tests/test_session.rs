use collab_common::SessionIdentity;
use collab_config::Config;
use collab_sync::{Collaborator, MatchConfig, Patch, SessionManager, ShareSession, SyncError};
use collab_test_helpers::prelude::*;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

type Manager = SessionManager<RecordingTransport, MemoryHost, RecordingUi>;

fn manager() -> Manager {
    let mut config = Config::default();
    config.session.user = "carl".to_string();
    SessionManager::new(RecordingTransport::default(), &config).unwrap()
}

fn open(manager: &Manager, path: &str, text: &str) -> ShareSession<MemoryHost, RecordingUi> {
    manager.session("notes", path, MemoryHost::new(text), RecordingUi::default())
}

fn make(from: &str, to: &str) -> Vec<Patch> {
    Patch::make(from, to, &MatchConfig::default())
}

#[test]
fn test_selection_follows_remote_insert() {
    suppress_logs();
    let before = "first line of the document\nsecond line holds the selection here\nthird line";
    let after = "the very first line of the document\nsecond line holds the selection here\nthird line";

    let manager = manager();
    let mut session = open(&manager, "doc.txt", before);
    session
        .host_mut()
        .select(Position::new(1, 22), Position::new(1, 31));

    session.patch_text(&make(before, after));

    assert_eq!(session.get_text(false).unwrap(), after);
    assert_eq!(
        session.host().selection(),
        Range::new(Position::new(1, 22), Position::new(1, 31))
    );
    assert_eq!(session.host().writes(), 1);
}

#[test]
fn test_selection_inside_remote_delete_collapses() {
    suppress_logs();
    let manager = manager();
    let mut session = open(&manager, "doc.txt", "abcdef");
    session
        .host_mut()
        .select(Position::new(0, 2), Position::new(0, 4));

    session.patch_text(&make("abcdef", "af"));

    assert_eq!(session.host().text(), "af");
    assert_eq!(
        session.host().selection(),
        Range::caret(Position::new(0, 1))
    );
    assert_eq!(session.host().cursor_moves().len(), 1);
}

#[test]
fn test_server_text_replaces_document() {
    let manager = manager();
    let mut session = open(&manager, "doc.txt", "");

    assert!(matches!(
        session.get_text(false),
        Err(SyncError::IllegalState(_))
    ));

    session.set_text("from the server");
    assert_eq!(session.get_text(false).unwrap(), "from the server");
}

#[test]
fn test_first_sync_callback_runs_once() {
    let manager = manager();
    let fired = Rc::new(Cell::new(0));
    let counter = Rc::clone(&fired);
    let mut session =
        open(&manager, "doc.txt", "").with_first_sync(move || counter.set(counter.get() + 1));

    session.set_text("abc");
    session.patch_text(&make("abc", "abcd"));
    session.set_text("xyz");

    assert_eq!(fired.get(), 1);
}

#[test]
fn test_roster() {
    let manager = manager();
    let mut session = open(&manager, "doc.txt", "");
    let entries: Vec<Collaborator> =
        serde_json::from_str(r#"[{"handle":"bob"},{"handle":"alice"},{"handle":"bob"}]"#).unwrap();

    session.report_collaborators(&entries);
    session.report_collaborators(&entries);

    assert_eq!(session.ui().rosters.len(), 1);
    assert_eq!(
        session.ui().roster(),
        Some(&["carl".to_string(), "alice".to_string(), "bob".to_string()][..])
    );
}

#[test]
fn test_fatal_error_locks_until_next_sync() {
    suppress_logs();
    let manager = manager();
    let mut session = open(&manager, "doc.txt", "text");

    session.raise_error("lost sync with server", false);
    session.raise_error("lost sync with server", false);

    assert!(session.host().is_read_only());
    assert_eq!(session.ui().errors.len(), 2);
    assert!(fatal_banner().eval(session.ui().errors[0].as_str()));

    session.sync_without_change();
    assert!(!session.host().is_read_only());
}

#[test]
fn test_switching_target_unshares_previous() {
    let mut manager = manager();

    let first = open(&manager, "a.txt", "a");
    assert!(manager.switch_target(first).is_none());

    // Same key again is a no-op
    let again = open(&manager, "a.txt", "a");
    assert!(manager.switch_target(again).is_none());
    assert_eq!(manager.transport().calls.len(), 1);

    let second = open(&manager, "b.txt", "b");
    let previous = manager.switch_target(second).unwrap();

    assert_eq!(previous.key(), "carl+notes/a.txt");
    assert_eq!(
        manager.transport().calls,
        vec![
            TransportCall::Share("carl+notes/a.txt".to_string()),
            TransportCall::Unshare(vec!["carl+notes/a.txt".to_string()]),
            TransportCall::Share("carl+notes/b.txt".to_string()),
        ]
    );
    assert_eq!(manager.transport().shared(), vec!["carl+notes/b.txt"]);
    assert_eq!(manager.active().map(|s| s.key()), Some("carl+notes/b.txt"));

    manager.close();
    assert!(manager.transport().shared().is_empty());
    assert!(manager.active().is_none());
}

#[test]
fn test_session_user_and_poll_interval_come_from_config() {
    let project = project_with_config("[session]\nuser = \"carl\"\npoll_interval_ms = 250\n");
    let config = Config::load(project.path()).unwrap();
    let mut manager: Manager = SessionManager::new(RecordingTransport::default(), &config).unwrap();

    assert_eq!(manager.user(), "carl");
    let session = manager.session(
        "alice+notes",
        "b.txt",
        MemoryHost::new(""),
        RecordingUi::default(),
    );
    assert_eq!(
        session.identity(),
        &SessionIdentity::new("carl", "alice+notes", "b.txt")
    );
    assert_eq!(session.key(), "alice+notes/b.txt");

    manager.deliver("F:1:carl+notes/a.txt\n");

    assert_eq!(
        manager.transport().calls,
        vec![
            TransportCall::Reflect("F:1:carl+notes/a.txt\n".to_string()),
            TransportCall::SchedulePoll(Duration::from_millis(250)),
        ]
    );
}

#[test]
fn test_invalid_matching_config_is_rejected() {
    let mut config = Config::default();
    config.matching.patch_threshold = 1.5;

    let err = Manager::new(RecordingTransport::default(), &config).err();
    assert!(matches!(err, Some(SyncError::ConfigError(_))));
}
