//! Persistence tests for LocalStorage
//!
//! Each test uses its own temporary cache directory and reopens stores to
//! simulate a process restart.

use storage::glam::{Quat, Vec3};
use storage::{Degree, LocalStorage, StorageConfig, StorageHost};
use tempfile::TempDir;

fn temp_config() -> (TempDir, StorageConfig) {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_cache_dir(dir.path());
    (dir, config)
}

#[test]
fn test_value_survives_restart() {
    let (_dir, config) = temp_config();

    {
        let mut store = LocalStorage::open_in(&config, "profile1", "common").unwrap();
        store.set("volume", 80);
        store.save().unwrap();
    }

    let store = LocalStorage::open_in(&config, "profile1", "common").unwrap();
    assert_eq!(store.get_int("volume"), 80);
    assert!(!store.is_dirty());
}

#[test]
fn test_drop_flushes_dirty_store() {
    let (_dir, config) = temp_config();

    {
        let mut store = LocalStorage::open_in(&config, "autosave", "common").unwrap();
        store.set("camera.position", Vec3::new(10.0, 2.0, -5.5));
        store.set("camera.rotation", Quat::IDENTITY);
        store.set("camera.fov", Degree(75.0));
        // no explicit save
    }

    let store = LocalStorage::open_in(&config, "autosave", "common").unwrap();
    assert_eq!(store.get_vector3("camera.position"), Vec3::new(10.0, 2.0, -5.5));
    assert_eq!(store.get_quaternion("camera.rotation"), Quat::IDENTITY);
    assert!((store.get_degree("camera.fov").0 - 75.0).abs() < 1e-3);
}

#[test]
fn test_file_layout() {
    let (dir, config) = temp_config();

    let mut store = LocalStorage::open_in(&config, "My Mod/v1", "settings").unwrap();
    store.set("volume", 80);
    store.set("muted", false);
    store.set("weather.rain", 0.5f32);
    store.save().unwrap();

    let path = dir.path().join("My_Mod_v1.asdata");
    assert_eq!(store.path(), Some(path.as_path()));

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "[settings]\nmuted=false\nvolume=80\n\n[weather]\nrain=0.5\n"
    );
}

#[test]
fn test_reads_hand_written_file() {
    let (dir, config) = temp_config();
    std::fs::write(
        dir.path().join("handmade.asdata"),
        "; edited by hand\n[common]\n  lives = 3  \nhard = yes\n[spawn]\npos = 1 2 3\n",
    )
    .unwrap();

    let store = LocalStorage::open_in(&config, "handmade", "common").unwrap();
    assert_eq!(store.get_int("lives"), 3);
    assert!(store.get_bool("hard"));
    assert_eq!(store.get_vector3("spawn.pos"), Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn test_erase_is_persisted() {
    let (_dir, config) = temp_config();

    {
        let mut store = LocalStorage::open_in(&config, "erase", "common").unwrap();
        store.set("a", 1);
        store.set("b", 2);
        store.save().unwrap();

        assert!(store.erase("a"));
        assert!(!store.erase("a"));
        store.save().unwrap();
    }

    let store = LocalStorage::open_in(&config, "erase", "common").unwrap();
    assert!(!store.exists("a"));
    assert!(store.exists("b"));
}

#[test]
fn test_change_section_scopes_unprefixed_keys() {
    let (_dir, config) = temp_config();
    let mut store = LocalStorage::open_in(&config, "sections", "common").unwrap();

    store.change_section("weather");
    store.set_str("rain", "1");
    assert_eq!(store.get("weather.rain"), "1");
    assert_eq!(store.get("rain"), "1");
    assert!(!store.exists("common.rain"));
}

#[test]
fn test_assign_keeps_destination_file() {
    let (dir, config) = temp_config();

    let mut source = LocalStorage::open_in(&config, "source", "common").unwrap();
    source.set("score", 100);

    {
        let mut dest = LocalStorage::open_in(&config, "dest", "common").unwrap();
        dest.set("own", 1);
        dest.assign_from(&source);
        dest.save().unwrap();
    }

    let dest = LocalStorage::open_in(&config, "dest", "common").unwrap();
    assert_eq!(dest.get_int("score"), 100);
    assert_eq!(dest.get_int("own"), 1);
    assert!(dir.path().join("dest.asdata").exists());
}

#[test]
fn test_host_flushes_when_last_handle_drops() {
    let (_dir, config) = temp_config();
    let mut host = StorageHost::new(config.clone());

    let first = host.open("shared", "common").unwrap();
    let second = host.open("shared", "common").unwrap();
    first.borrow_mut().set("visits", 2);
    drop(first);

    // still held by `second`, nothing written yet
    assert!(!config.path_for("shared").exists());

    drop(second);
    let store = LocalStorage::open_in(&config, "shared", "common").unwrap();
    assert_eq!(store.get_int("visits"), 2);
}

#[test]
fn test_awkward_keys_do_not_disturb_neighbours() {
    let (_dir, config) = temp_config();

    {
        let mut store = LocalStorage::open_in(&config, "awkward", "common").unwrap();
        store.set_str("[note", "todo]");
        store.set("volume", 80);
        store.set_str("name", " Ann ");
        store.set_str("a=b", "v");
        store.set_str("#tag", "1");
        store.set_str(";semi", "2");
        store.set_str("multi\nkey", "z");
        store.set_str("notes.body", "first line\nsecond\tline  ");
        store.save().unwrap();
    }

    let store = LocalStorage::open_in(&config, "awkward", "common").unwrap();
    let sections: Vec<_> = store.sections().collect();
    assert_eq!(sections, vec!["common", "notes"]);

    assert_eq!(store.get_int("volume"), 80);
    assert_eq!(store.raw("name"), Some(" Ann "));
    assert_eq!(store.raw("[note"), Some("todo]"));
    assert_eq!(store.raw("a=b"), Some("v"));
    assert_eq!(store.raw("#tag"), Some("1"));
    assert_eq!(store.raw(";semi"), Some("2"));
    assert_eq!(store.raw("multi\nkey"), Some("z"));
    assert_eq!(store.raw("notes.body"), Some("first line\nsecond\tline  "));
}

#[test]
fn test_out_of_range_int_reads_as_zero() {
    let (dir, config) = temp_config();
    std::fs::write(
        dir.path().join("overflow.asdata"),
        "[common]\nbig=3000000000\nsmall=-3000000000\nok=2147483647\n",
    )
    .unwrap();

    let store = LocalStorage::open_in(&config, "overflow", "common").unwrap();
    assert_eq!(store.get_int("big"), 0);
    assert_eq!(store.get_int("small"), 0);
    assert_eq!(store.get_int("ok"), i32::MAX);
    // the raw text is untouched
    assert_eq!(store.get("big"), "3000000000");
}
