//! Resolving a moved build tree through workspace search, then learned prefixes

use crate::common::{Harness, sarif_log};
use sarif_rebaseline::{InMemoryFileSystem, Learned, PathPrefixRemap, Strategy};
use std::path::PathBuf;

const SRCROOT: &str = r#""SRCROOT": { "uri": "file:///build/" }"#;

fn harness() -> Harness {
    let fs = InMemoryFileSystem::new()
        .with_file("/dev/myrepo/app/main.c", "int main() {}\n")
        .with_file("/dev/myrepo/app/util.c", "void util() {}\n");
    Harness::new(fs).workspace("/dev/myrepo")
}

#[test]
fn test_workspace_search_then_learned_prefix() {
    let mut h = harness();
    let run = h.load(
        "/logs/build.sarif",
        &sarif_log(
            SRCROOT,
            "",
            &[("app/main.c", Some("SRCROOT")), ("app/util.c", Some("SRCROOT"))],
        ),
    );

    let first = h
        .service
        .resolve_detailed(0, run, Some("SRCROOT"), "app/main.c")
        .unwrap()
        .unwrap();
    assert_eq!(first.path, PathBuf::from("/dev/myrepo/app/main.c"));
    assert_eq!(first.strategy, Strategy::Workspace);
    assert_eq!(
        first.learned,
        Learned::PrefixRule(PathPrefixRemap::new("/build", "/dev/myrepo"))
    );
    assert_eq!(h.fs.enumeration_count(), 1);

    let cache = &h.service.run(run).unwrap().paths;
    assert_eq!(
        cache.remapped_path_prefixes(),
        [PathPrefixRemap::new("/build", "/dev/myrepo")]
    );
    assert!(cache.remapped_uri_base_paths().is_empty());

    let second = h
        .service
        .resolve_detailed(1, run, Some("SRCROOT"), "app/util.c")
        .unwrap()
        .unwrap();
    assert_eq!(second.path, PathBuf::from("/dev/myrepo/app/util.c"));
    assert_eq!(second.strategy, Strategy::LearnedPrefix);
    // No second workspace search
    assert_eq!(h.fs.enumeration_count(), 1);
    assert_eq!(h.ui.browse_count(), 0);
}

#[test]
fn test_declared_base_hit_needs_no_search() {
    let fs = InMemoryFileSystem::new().with_file("/build/app/main.c", "int main() {}\n");
    let mut h = Harness::new(fs).workspace("/dev/myrepo");
    let run = h.load(
        "/logs/build.sarif",
        &sarif_log(SRCROOT, "", &[("app/main.c", Some("SRCROOT"))]),
    );

    let resolved = h
        .service
        .resolve_detailed(0, run, Some("SRCROOT"), "app/main.c")
        .unwrap()
        .unwrap();
    assert_eq!(resolved.strategy, Strategy::UriBase);
    assert_eq!(resolved.learned, Learned::Nothing);
    assert_eq!(h.fs.enumeration_count(), 0);
}

#[test]
fn test_ambiguous_workspace_match_is_not_picked() {
    let fs = InMemoryFileSystem::new()
        .with_file("/ws/src/proj1/Foo.cs", "class Foo {}")
        .with_file("/ws/src/proj2/Foo.cs", "class Foo {}");
    let mut h = Harness::new(fs).workspace("/ws");
    let run = h.load("/logs/a.sarif", &sarif_log("", "", &[("Foo.cs", None)]));

    let resolved = h.service.try_resolve_file_path(0, run, None, "Foo.cs").unwrap();
    assert_eq!(resolved, None);
    // Fell through to asking the user, who cancelled
    assert_eq!(h.ui.browse_count(), 1);
    assert!(h.service.run(run).unwrap().paths.remapped_path_prefixes().is_empty());
}

#[test]
fn test_more_specific_path_disambiguates() {
    let fs = InMemoryFileSystem::new()
        .with_file("/ws/src/proj1/Foo.cs", "class Foo {}")
        .with_file("/ws/src/proj2/Foo.cs", "class Foo {}");
    let mut h = Harness::new(fs).workspace("/ws");
    let run = h.load("/logs/a.sarif", &sarif_log("", "", &[("proj2/Foo.cs", None)]));

    let resolved = h
        .service
        .try_resolve_file_path(0, run, None, "PROJ2/foo.cs")
        .unwrap();
    assert_eq!(resolved, Some(PathBuf::from("/ws/src/proj2/Foo.cs")));
}

#[test]
fn test_resolving_to_the_same_path_is_a_failure() {
    let fs = InMemoryFileSystem::new().with_file("src/a.cs", "class A {}");
    let mut h = Harness::new(fs);
    let run = h.load(
        "/logs/a.sarif",
        &sarif_log("", "", &[("src/a.cs", Some("UNDECLARED")), ("src/a.cs", None)]),
    );

    // Found as written under an unknown base
    let resolved = h
        .service
        .try_resolve_file_path(0, run, Some("UNDECLARED"), "src/a.cs")
        .unwrap();
    assert_eq!(resolved, None);

    // The user pointing at the same path changes nothing either
    h.ui.answer_browse(Some("SRC/A.CS"));
    let resolved = h.service.try_resolve_file_path(1, run, None, "src/a.cs").unwrap();
    assert_eq!(resolved, None);

    let cache = &h.service.run(run).unwrap().paths;
    assert!(cache.remapped_path_prefixes().is_empty());
    assert!(cache.remapped_uri_base_paths().is_empty());
    assert_eq!(h.service.run(run).unwrap().results[0].file_path, "src/a.cs");
}

#[test]
fn test_empty_path_resolves_to_nothing() {
    let mut h = harness();
    let run = h.load("/logs/a.sarif", &sarif_log("", "", &[("a.c", None)]));

    assert_eq!(h.service.try_resolve_file_path(0, run, None, "").unwrap(), None);
    assert_eq!(h.ui.browse_count(), 0);
}

#[test]
fn test_mapped_to_provenance_resolves() {
    let json = r#"{
      "version": "2.1.0",
      "runs": [{
        "tool": { "driver": { "name": "test" } },
        "versionControlProvenance": [{
          "repositoryUri": "https://example.com/o/r",
          "mappedTo": { "uri": "file:///checkout/" }
        }],
        "results": [{ "locations": [{ "physicalLocation": {
          "artifactLocation": { "uri": "lib/x.c" } } }] }]
      }]
    }"#;
    let fs = InMemoryFileSystem::new().with_file("/checkout/lib/x.c", "x");
    let mut h = Harness::new(fs);
    let run = h.load("/logs/vcs.sarif", json);

    let resolved = h
        .service
        .resolve_detailed(0, run, None, "lib/x.c")
        .unwrap()
        .unwrap();
    assert_eq!(resolved.strategy, Strategy::SourceControl);
    assert_eq!(resolved.path, PathBuf::from("/checkout/lib/x.c"));
}
