use std::thread;
use std::time::{Duration, SystemTime};

use parchment::cache::HEADER_PREFIX;

use super::common::{set_mtime, Fixture};

#[test]
fn test_freshness_idempotence() {
    let fx = Fixture::new();
    let path = fx.write("page.tpl", "{{ 1 ~ 2 }}");
    set_mtime(&path, SystemTime::now() - Duration::from_secs(120));
    let tpl = fx.engine.template(&path);

    assert_eq!(tpl.output().unwrap(), "12");
    assert_eq!(tpl.output().unwrap(), "12");
    let stats = fx.engine.cache().stats();
    assert_eq!(stats.compiles, 1);
    assert_eq!(stats.hits, 1);

    // step past the coarse filesystem clock before touching the source
    thread::sleep(Duration::from_millis(50));
    set_mtime(&path, SystemTime::now() - Duration::from_millis(25));
    assert_eq!(tpl.output().unwrap(), "12");
    assert_eq!(fx.engine.cache().stats().compiles, 2);

    assert_eq!(tpl.output().unwrap(), "12");
    assert_eq!(fx.engine.cache().stats().compiles, 2);
}

#[test]
fn test_source_edit_is_picked_up() {
    let fx = Fixture::new();
    let path = fx.write("page.tpl", "old");
    set_mtime(&path, SystemTime::now() - Duration::from_secs(120));
    assert_eq!(fx.engine.template(&path).output().unwrap(), "old");

    std::fs::write(&path, "new").unwrap();
    set_mtime(&path, SystemTime::now() + Duration::from_secs(60));
    assert_eq!(fx.engine.template(&path).output().unwrap(), "new");
}

#[test]
fn test_artifact_header_names_source() {
    let fx = Fixture::new();
    let path = fx.write("page.tpl", "x");
    let artifact = fx.engine.compile(&path).unwrap();
    let text = std::fs::read_to_string(&artifact).unwrap();
    let first = text.lines().next().unwrap();
    assert!(first.starts_with(HEADER_PREFIX));
    assert!(first.ends_with("page.tpl"));
}

#[test]
fn test_clean_removes_artifacts() {
    let fx = Fixture::new();
    fx.render("a.tpl", "a");
    fx.render("b.tpl", "b");
    assert_eq!(fx.engine.cache().clear().unwrap(), 2);
    assert_eq!(fx.engine.cache().clear().unwrap(), 0);
}
