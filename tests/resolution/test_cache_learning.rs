//! What a run's path cache learns, and that it stays bounded

use crate::common::{Harness, sarif_log};
use sarif_rebaseline::{InMemoryFileSystem, Learned, PathPrefixRemap, Strategy};
use std::path::PathBuf;
use url::Url;

#[test]
fn test_undeclared_base_is_learned_as_substitution() {
    let fs = InMemoryFileSystem::new()
        .with_file("/home/me/repo/src/a.c", "a")
        .with_file("/home/me/repo/src/b.c", "b");
    let mut h = Harness::new(fs).workspace("/home/me/repo");
    let run = h.load(
        "/logs/a.sarif",
        &sarif_log("", "", &[("src/a.c", Some("REPO")), ("src/b.c", Some("REPO"))]),
    );

    let first = h
        .service
        .resolve_detailed(0, run, Some("REPO"), "src/a.c")
        .unwrap()
        .unwrap();
    assert_eq!(first.strategy, Strategy::Workspace);
    assert!(matches!(first.learned, Learned::UriBase { .. }));

    let cache = &h.service.run(run).unwrap().paths;
    assert_eq!(
        cache.remapped_base_uri("REPO").map(Url::as_str),
        Some("file:///home/me/repo/")
    );
    assert!(cache.remapped_path_prefixes().is_empty());

    let second = h
        .service
        .resolve_detailed(1, run, Some("REPO"), "src/b.c")
        .unwrap()
        .unwrap();
    assert_eq!(second.strategy, Strategy::UriBase);
    assert_eq!(second.path, PathBuf::from("/home/me/repo/src/b.c"));
    assert_eq!(h.fs.enumeration_count(), 1);
}

#[test]
fn test_each_resolution_adds_exactly_one_entry() {
    let fs = InMemoryFileSystem::new()
        .with_file("/dev/alpha/x.c", "x")
        .with_file("/dev/beta/y.c", "y");
    let mut h = Harness::new(fs).workspace("/dev");
    let run = h.load(
        "/logs/a.sarif",
        &sarif_log(
            r#""A": { "uri": "file:///build/a/" }, "B": { "uri": "file:///other/b/" }"#,
            "",
            &[("x.c", Some("A")), ("y.c", Some("B"))],
        ),
    );

    h.service.try_resolve_file_path(0, run, Some("A"), "x.c").unwrap().unwrap();
    let cache = &h.service.run(run).unwrap().paths;
    assert_eq!(cache.remapped_path_prefixes(), [PathPrefixRemap::new("/build/a", "/dev/alpha")]);
    assert!(cache.remapped_uri_base_paths().is_empty());

    h.service.try_resolve_file_path(1, run, Some("B"), "y.c").unwrap().unwrap();
    let cache = &h.service.run(run).unwrap().paths;
    assert_eq!(
        cache.remapped_path_prefixes()[1],
        PathPrefixRemap::new("/other/b", "/dev/beta")
    );
    assert!(cache.remapped_uri_base_paths().is_empty());
}

#[test]
fn test_repeated_resolutions_do_not_grow_the_cache() {
    let fs = InMemoryFileSystem::new().with_file("/dev/myrepo/app/main.c", "int main;");
    let mut h = Harness::new(fs).workspace("/dev/myrepo");
    let run = h.load(
        "/logs/a.sarif",
        &sarif_log(
            r#""SRCROOT": { "uri": "file:///build/" }"#,
            "",
            &[("app/main.c", Some("SRCROOT"))],
        ),
    );

    let first = h
        .service
        .resolve_detailed(0, run, Some("SRCROOT"), "app/main.c")
        .unwrap()
        .unwrap();
    assert!(matches!(first.learned, Learned::PrefixRule(_)));

    for _ in 0..5 {
        let again = h
            .service
            .resolve_detailed(0, run, Some("SRCROOT"), "app/main.c")
            .unwrap()
            .unwrap();
        assert_eq!(again.strategy, Strategy::LearnedPrefix);
        assert_eq!(again.learned, Learned::AlreadyKnown);
    }

    let cache = &h.service.run(run).unwrap().paths;
    assert_eq!(cache.remapped_path_prefixes().len(), 1);
    assert!(cache.remapped_uri_base_paths().is_empty());
    assert_eq!(h.fs.enumeration_count(), 1);
}

#[test]
fn test_cancelled_prompt_leaves_cache_untouched() {
    let mut h = Harness::new(InMemoryFileSystem::new());
    let run = h.load(
        "/logs/a.sarif",
        &sarif_log(
            r#""SRCROOT": { "uri": "file:///build/" }"#,
            "",
            &[("app/main.c", Some("SRCROOT"))],
        ),
    );

    h.ui.answer_browse(None);
    let resolved = h
        .service
        .try_resolve_file_path(0, run, Some("SRCROOT"), "app/main.c")
        .unwrap();
    assert_eq!(resolved, None);
    assert_eq!(h.ui.browse_count(), 1);

    let cache = &h.service.run(run).unwrap().paths;
    assert!(cache.remapped_path_prefixes().is_empty());
    assert!(cache.remapped_uri_base_paths().is_empty());
}

#[test]
fn test_browsed_path_without_common_suffix_is_rejected() {
    let fs = InMemoryFileSystem::new().with_file("/elsewhere/other.c", "x");
    let mut h = Harness::new(fs);
    let run = h.load("/logs/a.sarif", &sarif_log("", "", &[("src/a.c", None)]));

    h.ui.answer_browse(Some("/elsewhere/other.c"));
    let resolved = h.service.try_resolve_file_path(0, run, None, "src/a.c").unwrap();
    assert_eq!(resolved, None);
    assert!(h.service.run(run).unwrap().paths.remapped_path_prefixes().is_empty());
}

#[test]
fn test_browsed_path_teaches_a_directory_prepend() {
    let fs = InMemoryFileSystem::new()
        .with_file("/ws/src/a.c", "a")
        .with_file("/ws/src/b.c", "b");
    let mut h = Harness::new(fs);
    let run = h.load(
        "/logs/a.sarif",
        &sarif_log("", "", &[("src/a.c", None), ("src/b.c", None)]),
    );

    h.ui.answer_browse(Some("/ws/src/a.c"));
    let first = h
        .service
        .resolve_detailed(0, run, None, "src/a.c")
        .unwrap()
        .unwrap();
    assert_eq!(first.strategy, Strategy::Prompt);
    assert_eq!(
        first.learned,
        Learned::PrefixRule(PathPrefixRemap::new("", "/ws"))
    );

    let second = h
        .service
        .resolve_detailed(1, run, None, "src/b.c")
        .unwrap()
        .unwrap();
    assert_eq!(second.strategy, Strategy::LearnedPrefix);
    assert_eq!(second.path, PathBuf::from("/ws/src/b.c"));
    assert_eq!(h.ui.browse_count(), 1);
}
