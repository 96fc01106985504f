//! Downloads through the host allow-list

use crate::common::{FakeHttp, Harness, ScriptedUi, build_service, sarif_log};
use sarif_rebaseline::{DownloadConsent, FileSystem, InMemoryFileSystem, Strategy};
use std::path::Path;
use std::sync::Arc;

const BLOB_A: &str = "https://github.com/o/r/blob/main/src/a.c";
const BLOB_B: &str = "https://github.com/o/r/blob/main/src/b.c";
const RAW_HOST: &str = "raw.githubusercontent.com";

fn always_allow() -> DownloadConsent {
    DownloadConsent {
        allow: true,
        always_allow: true,
    }
}

fn web_log() -> String {
    sarif_log("", "", &[(BLOB_A, None), (BLOB_B, None)])
}

#[test]
fn test_always_allow_is_persisted_and_skips_later_prompts() {
    let mut h = Harness::with_http(InMemoryFileSystem::new(), FakeHttp::new(200, "int a;"));
    h.ui.set_consent(always_allow());
    let run = h.load("/logs/web.sarif", &web_log());

    let first = h
        .service
        .resolve_detailed(0, run, None, BLOB_A)
        .unwrap()
        .unwrap();
    assert_eq!(first.strategy, Strategy::Http);
    assert!(first.path.ends_with("o/r/main/src/a.c"));
    assert_eq!(
        h.http.requests.lock().as_slice(),
        ["https://raw.githubusercontent.com/o/r/main/src/a.c"]
    );

    h.service.resolve_detailed(1, run, None, BLOB_B).unwrap().unwrap();
    assert_eq!(h.ui.consent_count(), 1);
    assert_eq!(h.http.request_count(), 2);

    // A fresh session reading the same store
    let reloaded = build_service(
        &h.store,
        Arc::new(InMemoryFileSystem::new()),
        FakeHttp::new(200, ""),
        ScriptedUi::new(),
    );
    assert_eq!(reloaded.allowed_download_hosts(), [RAW_HOST]);
}

#[test]
fn test_declined_download_fetches_nothing() {
    let mut h = Harness::with_http(InMemoryFileSystem::new(), FakeHttp::new(200, "int a;"));
    let run = h.load("/logs/web.sarif", &web_log());

    let resolved = h.service.try_resolve_file_path(0, run, None, BLOB_A).unwrap();
    assert_eq!(resolved, None);
    assert_eq!(h.ui.consent_count(), 1);
    assert_eq!(h.http.request_count(), 0);
    // The fast path never falls through to asking for a local file
    assert_eq!(h.ui.browse_count(), 0);
    assert!(h.service.allowed_download_hosts().is_empty());
}

#[test]
fn test_http_failure_is_shown_at_navigation() {
    let mut h = Harness::with_http(InMemoryFileSystem::new(), FakeHttp::new(404, ""));
    h.ui.set_consent(DownloadConsent {
        allow: true,
        always_allow: false,
    });
    let run = h.load("/logs/web.sarif", &web_log());

    let err = h
        .service
        .try_resolve_file_path(0, run, None, BLOB_A)
        .unwrap_err();
    assert_eq!(err.status_code(), "FETCH_HTTP_STATUS");

    assert_eq!(h.service.resolve_for_navigation(0, run, None, BLOB_A), None);
    let errors = h.ui.errors.lock();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("404"));
    assert!(errors[0].contains("raw.githubusercontent.com/o/r/main/src/a.c"));
}

#[test]
fn test_existing_download_is_reused_without_freshness_check() {
    // Known limitation: a file already at the destination is never re-fetched,
    // even when the remote content changed since.
    let mut h = Harness::with_http(InMemoryFileSystem::new(), FakeHttp::new(200, "int a;"));
    h.ui.set_consent(always_allow());
    let run = h.load("/logs/web.sarif", &web_log());

    let first = h.service.try_resolve_file_path(0, run, None, BLOB_A).unwrap();
    let second = h.service.try_resolve_file_path(0, run, None, BLOB_A).unwrap();
    assert_eq!(first, second);
    assert_eq!(h.http.request_count(), 1);
}

#[test]
fn test_provenance_download_through_github_parser() {
    let json = r#"{
      "version": "2.1.0",
      "runs": [{
        "tool": { "driver": { "name": "test" } },
        "versionControlProvenance": [{
          "repositoryUri": "https://github.com/o/r",
          "revisionId": "abc123",
          "branch": "main"
        }],
        "invocations": [{ "workingDirectory": { "uri": "file:///work/" } }],
        "results": [{ "locations": [{ "physicalLocation": {
          "artifactLocation": { "uri": "src/a.c" } } }] }]
      }]
    }"#;
    let mut h = Harness::with_http(InMemoryFileSystem::new(), FakeHttp::new(200, "int a;"));
    h.ui.set_consent(always_allow());
    let run = h.load("/logs/vcs.sarif", json);

    let resolved = h
        .service
        .resolve_detailed(0, run, None, "src/a.c")
        .unwrap()
        .unwrap();
    assert_eq!(resolved.strategy, Strategy::SourceControl);
    assert_eq!(
        resolved.path,
        std::path::PathBuf::from("/work/o/r/main/src/a.c")
    );
    assert_eq!(
        h.http.requests.lock().as_slice(),
        ["https://raw.githubusercontent.com/o/r/main/src/a.c"]
    );
}

#[test]
fn test_provenance_download_failure_falls_through() {
    let json = r#"{
      "version": "2.1.0",
      "runs": [{
        "tool": { "driver": { "name": "test" } },
        "versionControlProvenance": [{
          "repositoryUri": "https://github.com/o/r",
          "branch": "main"
        }],
        "results": [{ "locations": [{ "physicalLocation": {
          "artifactLocation": { "uri": "src/a.c" } } }] }]
      }]
    }"#;
    let mut h = Harness::with_http(InMemoryFileSystem::new(), FakeHttp::new(500, ""));
    h.ui.set_consent(always_allow());
    let run = h.load("/logs/vcs.sarif", json);

    // Not an error: the strategy failed and the user was asked instead
    let resolved = h.service.try_resolve_file_path(0, run, None, "src/a.c").unwrap();
    assert_eq!(resolved, None);
    assert_eq!(h.ui.browse_count(), 1);
    assert!(h.ui.errors.lock().is_empty());
}

#[test]
fn test_provenance_hint_cannot_leave_the_working_directory() {
    let json = r#"{
      "version": "2.1.0",
      "runs": [{
        "tool": { "driver": { "name": "test" } },
        "versionControlProvenance": [{
          "repositoryUri": "https://dev.azure.com/org/proj/_git/repo",
          "branch": "main"
        }],
        "invocations": [{ "workingDirectory": { "uri": "file:///work/" } }],
        "results": [{ "locations": [{ "physicalLocation": {
          "artifactLocation": { "uri": "../../etc/profile" } } }] }]
      }]
    }"#;
    let mut h = Harness::with_settings(
        InMemoryFileSystem::new(),
        FakeHttp::new(200, "export PATH=/evil"),
        |settings| settings.vcs.azure_devops = true,
    );
    h.ui.set_consent(always_allow());
    let run = h.load("/logs/ado.sarif", json);

    // The download is refused before anyone is asked or anything is fetched
    let resolved = h
        .service
        .try_resolve_file_path(0, run, None, "../../etc/profile")
        .unwrap();
    assert_eq!(resolved, None);
    assert_eq!(h.ui.consent_count(), 0);
    assert_eq!(h.http.request_count(), 0);
    assert!(!h.fs.file_exists(Path::new("/etc/profile")));
    assert_eq!(h.ui.browse_count(), 1);
}

#[test]
fn test_interrupted_download_is_fetched_again() {
    let mut h = Harness::with_http(InMemoryFileSystem::new(), FakeHttp::interrupted_once("int a;"));
    h.ui.set_consent(always_allow());
    let run = h.load("/logs/web.sarif", &web_log());

    let err = h
        .service
        .try_resolve_file_path(0, run, None, BLOB_A)
        .unwrap_err();
    assert_eq!(err.status_code(), "FETCH_IO");
    assert_eq!(h.fs.write_count(), 0);

    // Nothing partial was left for the reuse check to pick up
    let path = h
        .service
        .try_resolve_file_path(0, run, None, BLOB_A)
        .unwrap()
        .unwrap();
    assert_eq!(h.http.request_count(), 2);
    assert_eq!(h.fs.read_to_string(&path).unwrap(), "int a;");
}
