use super::*;
use tempfile::tempdir;

#[test]
fn memory_kv_set_get_remove() {
    let kv = MemoryKv::new();
    assert_eq!(kv.get("token").unwrap(), None);
    kv.set("token", "abc").unwrap();
    assert_eq!(kv.get("token").unwrap().as_deref(), Some("abc"));
    kv.remove("token").unwrap();
    assert_eq!(kv.get("token").unwrap(), None);
}

#[test]
fn memory_kv_state_ends_with_the_instance() {
    let first = MemoryKv::new();
    first.set("token", "abc").unwrap();
    assert_eq!(MemoryKv::new().get("token").unwrap(), None);
}

#[test]
fn file_kv_persists_across_instances() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("nested").join("session.json");
    {
        let kv = FileKv::new(&path);
        kv.set("token", "t-1").unwrap();
        kv.set("roles", "[\"ADMIN\"]").unwrap();
    }
    let kv = FileKv::new(&path);
    assert_eq!(kv.get("token").unwrap().as_deref(), Some("t-1"));
    assert_eq!(kv.get("roles").unwrap().as_deref(), Some("[\"ADMIN\"]"));
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn file_kv_corrupt_file_reads_empty_and_recovers_on_write() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("session.json");
    std::fs::write(&path, "{not json").unwrap();
    let kv = FileKv::new(&path);
    assert_eq!(kv.get("token").unwrap(), None);
    kv.set("token", "fresh").unwrap();
    assert_eq!(kv.get("token").unwrap().as_deref(), Some("fresh"));
}

#[test]
fn file_kv_remove_on_missing_file_does_not_create_it() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("absent.json");
    let kv = FileKv::new(&path);
    kv.remove("token").unwrap();
    assert!(!path.exists());
}
