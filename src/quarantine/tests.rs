//! Tests for the quarantine store.

use super::*;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    _root: TempDir,
    work: PathBuf,
    store: QuarantineStore,
}

fn fixture() -> Fixture {
    let root = TempDir::new().unwrap();
    let work = root.path().join("work");
    fs::create_dir_all(&work).unwrap();
    let store = QuarantineStore::new(root.path().join("quarantine"));
    Fixture {
        _root: root,
        work,
        store,
    }
}

fn write(path: &Path, bytes: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
    path.to_path_buf()
}

#[tokio::test]
async fn quarantine_moves_and_records() {
    let fx = fixture();
    let file = write(&fx.work.join("report.pdf"), b"0123456789");

    let entries = fx.store.quarantine(std::slice::from_ref(&file)).await.unwrap();

    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert!(!file.exists());
    assert!(entry.quarantine_path.exists());
    assert!(entry.quarantine_path.starts_with(fx.store.items_dir()));
    let stored_name = entry.quarantine_path.file_name().unwrap().to_string_lossy();
    assert_eq!(stored_name, format!("{}_report.pdf", entry.id));
    assert_eq!(entry.original_path, file);
    assert_eq!(entry.size, 10);
    assert_eq!(entry.metadata.kind, EntryKind::File);
    assert!(entry.metadata.last_modified.is_some());
    assert_eq!(fx.store.get_entry(&entry.id).await.as_ref(), Some(entry));
}

#[tokio::test]
async fn same_name_items_do_not_collide() {
    let fx = fixture();
    let a = write(&fx.work.join("a/cache.db"), b"a");
    let b = write(&fx.work.join("b/cache.db"), b"bb");

    let entries = fx.store.quarantine(&[a, b]).await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_ne!(entries[0].quarantine_path, entries[1].quarantine_path);
    assert_eq!(fx.store.list_quarantine().await.len(), 2);
}

#[tokio::test]
async fn total_size_and_clear_all() {
    let fx = fixture();
    let a = write(&fx.work.join("thirteen.txt"), b"thirteen byte");
    let b = write(&fx.work.join("fourteen.txt"), b"fourteen bytes");

    fx.store.quarantine(&[a, b]).await.unwrap();

    assert_eq!(fx.store.get_total_size().await, 27);
    assert_eq!(fx.store.clear_all().await.unwrap(), 2);
    assert!(fx.store.list_quarantine().await.is_empty());
    assert_eq!(fs::read_dir(fx.store.items_dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn missing_path_is_skipped_and_batch_continues() {
    let fx = fixture();
    let missing = fx.work.join("gone.txt");
    let present = write(&fx.work.join("here.txt"), b"x");

    let entries = fx.store.quarantine(&[missing, present.clone()]).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].original_path, present);
}

#[tokio::test]
async fn directory_is_quarantined_whole() {
    let fx = fixture();
    let dir = fx.work.join("node_modules");
    write(&dir.join("a/index.js"), b"12345");
    write(&dir.join("b/index.js"), b"678");

    let entries = fx.store.quarantine(std::slice::from_ref(&dir)).await.unwrap();

    assert_eq!(entries[0].metadata.kind, EntryKind::Directory);
    assert_eq!(entries[0].size, 8);
    assert!(!dir.exists());
}

#[tokio::test]
async fn restore_puts_object_back_and_drops_entry() {
    let fx = fixture();
    let file = write(&fx.work.join("deep/nested/notes.md"), b"# notes");
    let entries = fx.store.quarantine(std::slice::from_ref(&file)).await.unwrap();
    fs::remove_dir_all(fx.work.join("deep")).unwrap();

    let outcome = fx.store.restore(&entries[0].id).await.unwrap();

    assert_eq!(outcome, RestoreOutcome::Restored(file.clone()));
    assert_eq!(fs::read(&file).unwrap(), b"# notes");
    assert!(fx.store.get_entry(&entries[0].id).await.is_none());
    assert!(fx.store.list_quarantine().await.is_empty());
}

#[tokio::test]
async fn restore_resolves_collisions_deterministically() {
    let fx = fixture();
    let file = write(&fx.work.join("data.csv"), b"old");
    let first = fx.store.quarantine(std::slice::from_ref(&file)).await.unwrap();
    write(&file, b"new");
    write(&fx.work.join("data_restored_1.csv"), b"taken");

    let outcome = fx.store.restore(&first[0].id).await.unwrap();

    let expected = fx.work.join("data_restored_2.csv");
    assert_eq!(outcome, RestoreOutcome::Restored(expected.clone()));
    assert_eq!(fs::read(&file).unwrap(), b"new");
    assert_eq!(fs::read(&expected).unwrap(), b"old");
}

#[tokio::test]
async fn restore_unknown_id_has_no_side_effects() {
    let fx = fixture();
    let file = write(&fx.work.join("keep.txt"), b"k");
    fx.store.quarantine(std::slice::from_ref(&file)).await.unwrap();
    let before = fs::read_to_string(fx.store.index_path()).unwrap();

    let outcome = fx.store.restore("not-a-real-id").await.unwrap();

    assert_eq!(outcome, RestoreOutcome::UnknownId);
    assert!(!outcome.is_restored());
    assert_eq!(fs::read_to_string(fx.store.index_path()).unwrap(), before);
}

#[tokio::test]
async fn restore_with_missing_object_fails_and_prune_drops_it() {
    let fx = fixture();
    let file = write(&fx.work.join("vanish.bin"), b"v");
    let entries = fx.store.quarantine(std::slice::from_ref(&file)).await.unwrap();
    fs::remove_file(&entries[0].quarantine_path).unwrap();

    let outcome = fx.store.restore(&entries[0].id).await.unwrap();

    assert_eq!(outcome, RestoreOutcome::MissingObject);
    assert!(!file.exists());
    assert_eq!(fx.store.prune_orphans().await.unwrap(), 1);
    assert!(fx.store.list_quarantine().await.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn restore_reapplies_permission_bits() {
    use std::os::unix::fs::PermissionsExt;

    let fx = fixture();
    let script = write(&fx.work.join("run.sh"), b"#!/bin/sh\n");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o750)).unwrap();
    let entries = fx.store.quarantine(std::slice::from_ref(&script)).await.unwrap();
    fs::set_permissions(&entries[0].quarantine_path, fs::Permissions::from_mode(0o600)).unwrap();

    fx.store.restore(&entries[0].id).await.unwrap();

    let mode = fs::metadata(&script).unwrap().permissions().mode() & 0o7777;
    assert_eq!(mode, 0o750);
}

#[tokio::test]
async fn cleanup_removes_only_expired_entries() {
    let fx = fixture();
    let old = write(&fx.work.join("old.log"), b"old");
    let fresh = write(&fx.work.join("fresh.log"), b"fresh");
    let entries = fx.store.quarantine(&[old, fresh]).await.unwrap();
    let (old_id, fresh_id) = (entries[0].id.clone(), entries[1].id.clone());

    let mut index = fx.store.load_index().await;
    index.entries.get_mut(&old_id).unwrap().moved_at = Utc::now() - Duration::days(31);
    index.entries.get_mut(&fresh_id).unwrap().moved_at = Utc::now() - Duration::days(29);
    fx.store.save_index(&mut index).await.unwrap();

    let removed = fx.store.cleanup(30).await.unwrap();

    assert_eq!(removed, 1);
    assert!(!entries[0].quarantine_path.exists());
    assert!(entries[1].quarantine_path.exists());
    let remaining: Vec<_> = fx
        .store
        .list_quarantine()
        .await
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(remaining, vec![fresh_id]);
}

#[tokio::test]
async fn cleanup_with_nothing_expired_is_a_no_op() {
    let fx = fixture();
    let file = write(&fx.work.join("recent.txt"), b"r");
    fx.store.quarantine(std::slice::from_ref(&file)).await.unwrap();

    assert_eq!(fx.store.cleanup(30).await.unwrap(), 0);
    assert_eq!(fx.store.list_quarantine().await.len(), 1);
}

#[tokio::test]
async fn cleanup_with_huge_retention_expires_nothing() {
    let fx = fixture();
    let file = write(&fx.work.join("kept.txt"), b"k");
    fx.store.quarantine(std::slice::from_ref(&file)).await.unwrap();

    assert_eq!(fx.store.cleanup(u32::MAX).await.unwrap(), 0);
    assert_eq!(fx.store.list_quarantine().await.len(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn failed_index_write_puts_objects_back() {
    use std::os::unix::fs::PermissionsExt;

    let fx = fixture();
    let a = write(&fx.work.join("a.txt"), b"a");
    let b = write(&fx.work.join("b.txt"), b"b");
    fs::create_dir_all(fx.store.items_dir()).unwrap();
    fs::set_permissions(fx.store.root(), fs::Permissions::from_mode(0o555)).unwrap();

    // Permission bits do not bind a privileged user; nothing to check then.
    let writable = fs::write(fx.store.root().join("write-check"), b"").is_ok();
    if writable {
        fs::set_permissions(fx.store.root(), fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = fx.store.quarantine(&[a.clone(), b.clone()]).await;
    fs::set_permissions(fx.store.root(), fs::Permissions::from_mode(0o755)).unwrap();

    assert!(result.is_err());
    assert_eq!(fs::read(&a).unwrap(), b"a");
    assert_eq!(fs::read(&b).unwrap(), b"b");
    assert_eq!(fs::read_dir(fx.store.items_dir()).unwrap().count(), 0);
    assert!(fx.store.list_quarantine().await.is_empty());
}

#[tokio::test]
async fn find_by_original_path_matches_exactly() {
    let fx = fixture();
    let file = write(&fx.work.join("build.log"), b"1");
    let other = write(&fx.work.join("build.log.1"), b"2");
    fx.store.quarantine(&[file.clone(), other]).await.unwrap();

    let found = fx.store.find_by_original_path(&file).await;

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].original_path, file);
}

#[tokio::test]
async fn index_round_trips_timestamps() {
    let fx = fixture();
    let file = write(&fx.work.join("t.txt"), b"t");
    let entries = fx.store.quarantine(std::slice::from_ref(&file)).await.unwrap();

    let reloaded = QuarantineStore::new(fx.store.root()).load_index().await;

    assert_eq!(reloaded.version, QuarantineIndex::CURRENT_VERSION);
    assert_eq!(reloaded.entries[&entries[0].id], entries[0]);
    let raw = fs::read_to_string(fx.store.index_path()).unwrap();
    assert!(raw.contains("\"originalPath\""));
    assert!(raw.contains("\"movedAt\""));
}

#[tokio::test]
async fn absent_index_reads_as_empty() {
    let fx = fixture();

    assert!(fx.store.list_quarantine().await.is_empty());
    assert_eq!(fx.store.get_total_size().await, 0);
    assert_eq!(fx.store.restore("anything").await.unwrap(), RestoreOutcome::UnknownId);
}

#[tokio::test]
async fn corrupt_index_degrades_to_empty_and_is_kept_aside() {
    let fx = fixture();
    fs::create_dir_all(fx.store.root()).unwrap();
    fs::write(fx.store.index_path(), b"{ not json").unwrap();

    assert!(fx.store.list_quarantine().await.is_empty());

    let file = write(&fx.work.join("after.txt"), b"a");
    fx.store.quarantine(std::slice::from_ref(&file)).await.unwrap();

    assert_eq!(fx.store.list_quarantine().await.len(), 1);
    let set_aside = fs::read_dir(fx.store.root())
        .unwrap()
        .filter_map(|e| e.ok())
        .any(|e| e.file_name().to_string_lossy().starts_with("index.corrupt-"));
    assert!(set_aside);
}

#[tokio::test]
async fn newer_index_version_is_still_read() {
    let fx = fixture();
    fs::create_dir_all(fx.store.root()).unwrap();
    let raw = format!(
        r#"{{"version": 7, "entries": {{}}, "lastUpdated": "{}", "futureField": true}}"#,
        Utc::now().to_rfc3339()
    );
    fs::write(fx.store.index_path(), raw).unwrap();

    let index = fx.store.load_index().await;

    assert_eq!(index.version, 7);
    assert!(index.entries.is_empty());
}
