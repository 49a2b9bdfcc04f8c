#![cfg(unix)]

use dc_switch_core::channel::ChannelPreference;
use dc_switch_core::error::CoreError;
use dc_switch_core::locator::{self, InstallationDescriptor};
use dc_switch_core::process;
use dc_switch_core::{Database, DiscordChannel, LauncherSettings, Profile, SwitchEngine, SwitchOutcome};
use rusty_leveldb::{LdbIterator, Options, DB};
use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const TOKEN_KEY: &[u8] = b"_https://discord.com\x00\x01token";

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

fn encoded(token: &str) -> Vec<u8> {
    let mut value = vec![0x01];
    value.extend_from_slice(format!("\"{token}\"").as_bytes());
    value
}

fn seed_store(root: &Path, entries: &[(&[u8], &[u8])]) -> PathBuf {
    let store_dir = root.join("Local Storage").join("leveldb");
    std::fs::create_dir_all(&store_dir).expect("create store dir");
    let mut db = DB::open(&store_dir, Options::default()).expect("open store");
    for (key, value) in entries {
        db.put(key, value).expect("seed put");
    }
    db.flush().expect("seed flush");
    store_dir
}

fn dump_store(dir: &Path) -> HashMap<Vec<u8>, Vec<u8>> {
    let mut db = DB::open(dir, Options::default()).expect("open store");
    let mut iter = db.new_iter().expect("iter");
    let mut entries = HashMap::new();
    let mut key = Vec::new();
    let mut value = Vec::new();
    iter.reset();
    while iter.advance() {
        if iter.current(&mut key, &mut value) {
            entries.insert(key.clone(), value.clone());
        }
    }
    entries
}

fn save_profile(db: &Database, id: &str, nickname: &str) -> Profile {
    let profile = Profile {
        id: id.to_string(),
        nickname: nickname.to_string(),
        avatar_color: "#4F7BFF".to_string(),
        created_at_ms: 0,
        has_token: false,
    };
    db.save_profile(&profile).expect("save profile");
    profile
}

/// Engine wired to a scratch store and a stub executable, so the full
/// protocol runs without a real client installed.
fn engine_with_db(root: &Path) -> (SwitchEngine, Arc<Database>) {
    let exe = write_script(root, "discord-stub", "exit 0");
    let db = Arc::new(Database::memory().expect("memory db"));
    db.save_launcher_settings(LauncherSettings {
        preferred_channel: ChannelPreference::Auto,
        custom_executable_path: Some(exe.display().to_string()),
    })
    .expect("save settings");

    let engine = SwitchEngine::new(db.clone())
        .with_store_root(root.to_path_buf())
        .with_stop_timeout(Duration::from_secs(2));
    (engine, db)
}

#[tokio::test]
async fn switch_injects_saved_token_and_preserves_other_keys() {
    let root = tempfile::tempdir().expect("tempdir");
    let (engine, db) = engine_with_db(root.path());
    save_profile(&db, "p1", "Work");
    db.set_profile_token("p1", Some("dQw4w9WgXcQ:v10:aaaa1111bbbb2222cccc"))
        .expect("set token");

    let store_dir = seed_store(
        root.path(),
        &[
            (TOKEN_KEY, encoded("dQw4w9WgXcQ:old:previous000000000").as_slice()),
            (b"_https://discord.com\x00\x01theme".as_slice(), b"\x01\"dark\"".as_slice()),
        ],
    );

    let outcome = engine.switch_to_profile("p1").await.expect("switch");
    match outcome {
        SwitchOutcome::TokenInjected { nickname } => assert_eq!(nickname, "Work"),
        other => panic!("unexpected outcome {other:?}"),
    }

    let entries = dump_store(&store_dir);
    assert_eq!(
        entries[TOKEN_KEY.to_vec().as_slice()],
        encoded("dQw4w9WgXcQ:v10:aaaa1111bbbb2222cccc")
    );
    assert_eq!(
        entries[b"_https://discord.com\x00\x01theme".to_vec().as_slice()],
        b"\x01\"dark\"".to_vec()
    );
}

#[tokio::test]
async fn switch_without_saved_token_leaves_store_untouched() {
    let root = tempfile::tempdir().expect("tempdir");
    let (engine, db) = engine_with_db(root.path());
    save_profile(&db, "p1", "Fresh");

    let store_dir = seed_store(
        root.path(),
        &[(TOKEN_KEY, encoded("dQw4w9WgXcQ:keep:me00000000000000").as_slice())],
    );

    let before: HashMap<PathBuf, Vec<u8>> = std::fs::read_dir(&store_dir)
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .map(|e| (e.path(), std::fs::read(e.path()).unwrap_or_default()))
        .collect();

    match engine.switch_to_profile("p1").await {
        Err(CoreError::NoSavedToken(nickname)) => assert_eq!(nickname, "Fresh"),
        other => panic!("expected NoSavedToken, got {other:?}"),
    }

    let after: HashMap<PathBuf, Vec<u8>> = std::fs::read_dir(&store_dir)
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .map(|e| (e.path(), std::fs::read(e.path()).unwrap_or_default()))
        .collect();
    assert_eq!(before, after, "store files changed on a rejected switch");
}

#[tokio::test]
async fn sequential_switches_leave_only_the_last_token() {
    let root = tempfile::tempdir().expect("tempdir");
    let (engine, db) = engine_with_db(root.path());
    save_profile(&db, "p1", "First");
    save_profile(&db, "p2", "Second");
    let t1 = "dQw4w9WgXcQ:v10:first1111111111111111";
    let t2 = "dQw4w9WgXcQ:v10:second22222222222222";
    db.set_profile_token("p1", Some(t1)).expect("t1");
    db.set_profile_token("p2", Some(t2)).expect("t2");

    let store_dir = seed_store(root.path(), &[]);

    engine.switch_to_profile("p1").await.expect("switch p1");
    engine.switch_to_profile("p2").await.expect("switch p2");

    let entries = dump_store(&store_dir);
    assert_eq!(entries[TOKEN_KEY.to_vec().as_slice()], encoded(t2));
    for value in entries.values() {
        assert!(
            !value
                .windows(t1.len())
                .any(|w| w == t1.as_bytes()),
            "stale token survives in a live record"
        );
    }
}

#[tokio::test]
async fn capture_saves_store_token_on_profile() {
    let root = tempfile::tempdir().expect("tempdir");
    let (engine, db) = engine_with_db(root.path());
    save_profile(&db, "p1", "Main");

    let token = "dQw4w9WgXcQ:v10:captured000000000000";
    seed_store(root.path(), &[(TOKEN_KEY, encoded(token).as_slice())]);

    let outcome = engine.capture_token("p1").await.expect("capture");
    match outcome {
        SwitchOutcome::TokenCaptured { profile } => {
            assert_eq!(profile.id, "p1");
            assert!(profile.has_token);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(
        db.get_profile_token("p1").expect("token"),
        Some(token.to_string())
    );
}

#[tokio::test]
async fn capture_without_credential_reports_none_found() {
    let root = tempfile::tempdir().expect("tempdir");
    let (engine, db) = engine_with_db(root.path());
    save_profile(&db, "p1", "Main");

    seed_store(
        root.path(),
        &[(b"_https://discord.com\x00\x01theme".as_slice(), b"\x01\"dark\"".as_slice())],
    );

    match engine.capture_token("p1").await {
        Err(CoreError::NoCredentialFound) => {}
        other => panic!("expected NoCredentialFound, got {other:?}"),
    }
    assert_eq!(db.get_profile_token("p1").expect("token"), None);
}

#[tokio::test]
async fn capture_for_unknown_profile_errors() {
    let root = tempfile::tempdir().expect("tempdir");
    let (engine, _db) = engine_with_db(root.path());
    seed_store(root.path(), &[]);

    match engine.capture_token("ghost").await {
        Err(CoreError::ProfileNotFound(id)) => assert_eq!(id, "ghost"),
        other => panic!("expected ProfileNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn prepare_login_clears_credential_and_is_idempotent() {
    let root = tempfile::tempdir().expect("tempdir");
    let (engine, _db) = engine_with_db(root.path());

    let store_dir = seed_store(
        root.path(),
        &[
            (TOKEN_KEY, encoded("dQw4w9WgXcQ:v10:oldlogin000000000000").as_slice()),
            (b"_https://discord.com\x00\x01theme".as_slice(), b"\x01\"dark\"".as_slice()),
        ],
    );

    let outcome = engine.prepare_login(None).await.expect("prepare");
    match outcome {
        SwitchOutcome::LaunchedForLogin { channel } => {
            assert_eq!(channel, DiscordChannel::Stable)
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    let entries = dump_store(&store_dir);
    assert!(!entries.contains_key(TOKEN_KEY.to_vec().as_slice()));
    assert!(entries.contains_key(b"_https://discord.com\x00\x01theme".as_slice()));

    // A second call while login is pending does nothing.
    match engine.prepare_login(None).await.expect("second prepare") {
        SwitchOutcome::NoOp => {}
        other => panic!("expected NoOp, got {other:?}"),
    }
}

#[tokio::test]
async fn capture_completes_a_pending_login() {
    let root = tempfile::tempdir().expect("tempdir");
    let (engine, db) = engine_with_db(root.path());
    save_profile(&db, "p1", "Main");

    let store_dir = seed_store(root.path(), &[]);
    engine.prepare_login(None).await.expect("prepare");

    // Simulate the user logging in: the client writes the token.
    let token = "dQw4w9WgXcQ:v10:loggedin000000000000";
    {
        let mut store = DB::open(&store_dir, Options::default()).expect("open");
        store.put(TOKEN_KEY, &encoded(token)).expect("put");
        store.flush().expect("flush");
    }

    engine.capture_token("p1").await.expect("capture");
    assert_eq!(
        db.get_profile_token("p1").expect("token"),
        Some(token.to_string())
    );

    // The pending-login state was consumed; the next prepare relaunches.
    match engine.prepare_login(None).await.expect("prepare again") {
        SwitchOutcome::LaunchedForLogin { .. } => {}
        other => panic!("expected relaunch, got {other:?}"),
    }
}

#[tokio::test]
async fn ensure_stopped_returns_quickly_when_nothing_runs() {
    let started = std::time::Instant::now();
    process::ensure_stopped(DiscordChannel::Canary, Duration::from_secs(5))
        .await
        .expect("nothing to stop");
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn wait_for_exit_reports_completion_and_timeout() {
    let dir = tempfile::tempdir().expect("tempdir");

    let quick = InstallationDescriptor {
        channel: DiscordChannel::Stable,
        label: "stub".to_string(),
        executable_path: write_script(dir.path(), "quick", "exit 0"),
        user_data_root: dir.path().to_path_buf(),
    };
    let mut session = process::launch(&quick).expect("launch quick");
    assert_eq!(session.channel(), DiscordChannel::Stable);
    assert!(session
        .wait_for_exit(Duration::from_secs(5))
        .await
        .expect("wait"));

    let slow = InstallationDescriptor {
        channel: DiscordChannel::Stable,
        label: "stub".to_string(),
        executable_path: write_script(dir.path(), "slow", "sleep 5"),
        user_data_root: dir.path().to_path_buf(),
    };
    let mut session = process::launch(&slow).expect("launch slow");
    assert!(!session
        .wait_for_exit(Duration::from_millis(200))
        .await
        .expect("wait"));
}

#[tokio::test]
async fn launch_rejects_vanished_executable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let descriptor = InstallationDescriptor {
        channel: DiscordChannel::Stable,
        label: "stub".to_string(),
        executable_path: dir.path().join("removed"),
        user_data_root: dir.path().to_path_buf(),
    };
    match process::launch(&descriptor) {
        Err(CoreError::LaunchFailed(_)) => {}
        other => panic!("expected LaunchFailed, got {other:?}"),
    }
}

#[test]
fn locate_uses_custom_override_as_sole_result() {
    let dir = tempfile::tempdir().expect("tempdir");
    let exe = write_script(dir.path(), "custom", "exit 0");

    let found =
        locator::locate(ChannelPreference::Canary, Some(&exe)).expect("locate with override");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].channel, DiscordChannel::Canary);
    assert_eq!(found[0].executable_path, exe);
}

#[test]
fn locate_ignores_dangling_custom_override() {
    let dangling = PathBuf::from("/does/not/exist/discord");
    match locator::locate(ChannelPreference::Auto, Some(&dangling)) {
        Ok(found) => assert!(found.iter().all(|d| d.executable_path != dangling)),
        Err(CoreError::NotFound(_)) => {}
        Err(other) => panic!("unexpected error {other:?}"),
    }
}
