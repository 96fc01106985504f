//! Local files checked against the hashes a log records for them

use crate::common::{Harness, TEMP_ROOT, sarif_log};
use sarif_rebaseline::hash::compute_sha256;
use sarif_rebaseline::{
    EmbeddedChoiceAnswer, EmbeddedFileChoice, FileSystem, InMemoryFileSystem, Strategy,
};
use std::path::{Path, PathBuf};

const EMBEDDED: &str = "int main() { return 0; }\n";
const LOCAL_EDITED: &str = "int main() { return 1; }\n";

fn artifact(uri: &str, text: Option<&str>, hash_of: &str) -> String {
    let contents = text
        .map(|t| format!(r#""contents": {{ "text": {} }},"#, serde_json::to_string(t).unwrap()))
        .unwrap_or_default();
    format!(
        r#"{{ "location": {{ "uri": "{uri}" }}, {contents}
             "hashes": {{ "sha-256": "{}" }} }}"#,
        compute_sha256(hash_of.as_bytes())
    )
}

fn harness(local: &str, artifacts: &str) -> (Harness, u32) {
    let fs = InMemoryFileSystem::new()
        .with_file("/ws/src/main.c", local)
        .with_file("/ws/src/other.c", LOCAL_EDITED);
    let mut h = Harness::new(fs).workspace("/ws");
    let run = h.load(
        "/logs/a.sarif",
        &sarif_log("", artifacts, &[("src/main.c", None), ("src/other.c", None)]),
    );
    (h, run)
}

fn embedded_path(name: &str, text: &str) -> PathBuf {
    Path::new(TEMP_ROOT)
        .join(compute_sha256(text.as_bytes()).as_str())
        .join(name)
}

#[test]
fn test_matching_hash_accepts_local_file() {
    let (mut h, run) = harness(EMBEDDED, &artifact("src/main.c", Some(EMBEDDED), EMBEDDED));

    let resolved = h
        .service
        .resolve_detailed(0, run, None, "src/main.c")
        .unwrap()
        .unwrap();
    assert_eq!(resolved.path, PathBuf::from("/ws/src/main.c"));
    assert_eq!(resolved.strategy, Strategy::Workspace);
    assert_eq!(h.ui.choice_count(), 0);
}

#[test]
fn test_remembered_embedded_choice_overrides_local_file() {
    let artifacts = [
        artifact("src/main.c", Some(EMBEDDED), EMBEDDED),
        artifact("src/other.c", Some(EMBEDDED), EMBEDDED),
    ]
    .join(",");
    let (mut h, run) = harness(LOCAL_EDITED, &artifacts);
    h.ui.answer_choice(EmbeddedChoiceAnswer::remembered(EmbeddedFileChoice::UseEmbedded));

    let first = h
        .service
        .resolve_detailed(0, run, None, "src/main.c")
        .unwrap()
        .unwrap();
    assert_eq!(first.strategy, Strategy::Embedded);
    assert_eq!(first.path, embedded_path("src/main.c", EMBEDDED));
    assert!(h.fs.is_readonly(&first.path));

    // Same log, another mismatch: the remembered answer applies without asking
    let second = h
        .service
        .resolve_detailed(1, run, None, "src/other.c")
        .unwrap()
        .unwrap();
    assert_eq!(second.path, embedded_path("src/other.c", EMBEDDED));
    assert_eq!(h.ui.choice_count(), 1);

    // Embedded copies teach nothing about the local tree
    assert!(h.service.run(run).unwrap().paths.remapped_path_prefixes().is_empty());
}

#[test]
fn test_remembered_embedded_choice_ignored_without_content() {
    let artifacts = [
        artifact("src/main.c", Some(EMBEDDED), EMBEDDED),
        // Hash only, nothing to materialize
        artifact("src/other.c", None, EMBEDDED),
    ]
    .join(",");
    let (mut h, run) = harness(LOCAL_EDITED, &artifacts);
    h.ui.answer_choice(EmbeddedChoiceAnswer::remembered(EmbeddedFileChoice::UseEmbedded));
    h.ui.answer_choice(EmbeddedChoiceAnswer::once(EmbeddedFileChoice::UseLocal));

    h.service.resolve_detailed(0, run, None, "src/main.c").unwrap().unwrap();

    let resolved = h
        .service
        .resolve_detailed(1, run, None, "src/other.c")
        .unwrap()
        .unwrap();
    assert_eq!(resolved.path, PathBuf::from("/ws/src/other.c"));
    assert_eq!(resolved.strategy, Strategy::Workspace);
    // Re-prompted instead of forcing the missing embedded copy
    assert_eq!(h.ui.choice_count(), 2);
}

#[test]
fn test_cancelled_choice_fails_without_falling_back() {
    let (mut h, run) = harness(LOCAL_EDITED, &artifact("src/main.c", Some(EMBEDDED), EMBEDDED));
    h.ui.answer_choice(EmbeddedChoiceAnswer::once(EmbeddedFileChoice::Cancelled));

    let resolved = h.service.try_resolve_file_path(0, run, None, "src/main.c").unwrap();
    assert_eq!(resolved, None);
    assert!(h.service.run(run).unwrap().paths.remapped_path_prefixes().is_empty());
    assert_eq!(h.service.run(run).unwrap().results[0].file_path, "src/main.c");
}

#[test]
fn test_browse_alternate_uses_the_chosen_file() {
    let (mut h, run) = harness(LOCAL_EDITED, &artifact("src/main.c", Some(EMBEDDED), EMBEDDED));
    h.fs.add_file("/backup/src/main.c", EMBEDDED);
    h.ui.answer_choice(EmbeddedChoiceAnswer::once(EmbeddedFileChoice::BrowseAlternate));
    h.ui.answer_browse(Some("/backup/src/main.c"));

    let resolved = h
        .service
        .resolve_detailed(0, run, None, "src/main.c")
        .unwrap()
        .unwrap();
    assert_eq!(resolved.path, PathBuf::from("/backup/src/main.c"));
    assert_eq!(resolved.strategy, Strategy::Prompt);
}

#[test]
fn test_embedded_copy_used_when_nothing_local_exists() {
    let mut h = Harness::new(InMemoryFileSystem::new());
    let run = h.load(
        "/logs/a.sarif",
        &sarif_log(
            "",
            &artifact("src/gone.c", Some(EMBEDDED), EMBEDDED),
            &[("src/gone.c", None)],
        ),
    );

    let resolved = h
        .service
        .resolve_detailed(0, run, None, "src/gone.c")
        .unwrap()
        .unwrap();
    assert_eq!(resolved.strategy, Strategy::Embedded);
    assert_eq!(resolved.path, embedded_path("src/gone.c", EMBEDDED));
    assert_eq!(h.ui.browse_count(), 0);
}

#[test]
fn test_materialize_is_idempotent() {
    let (mut h, run) = harness(EMBEDDED, &artifact("src/main.c", Some(EMBEDDED), EMBEDDED));
    let writes = h.fs.write_count();

    let first = h.service.materialize(run, "src/main.c").unwrap().unwrap();
    let second = h.service.materialize(run, "src/main.c").unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(h.fs.write_count(), writes + 1);

    // The materialized path is itself a lookup key
    let again = h
        .service
        .materialize(run, &first.to_string_lossy())
        .unwrap()
        .unwrap();
    assert_eq!(again, first);
    assert_eq!(h.fs.write_count(), writes + 1);

    assert_eq!(h.service.materialize(run, "src/unknown.c").unwrap(), None);

    h.service.remove_temporary_files().unwrap();
    assert!(!h.fs.file_exists(&first));
}
