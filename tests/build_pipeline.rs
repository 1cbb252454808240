// tests/build_pipeline.rs

mod common;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use common::{real_context, site, with_timeout};
use sitepipe::config::ConfigFile;
use sitepipe::errors::SitepipeError;
use sitepipe::pipeline::{Pipeline, Target};
use sitepipe::run_target;
use tempfile::TempDir;

/// Every file below `dir`, keyed by path relative to `dir`.
fn tree(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(base: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(base, &path, out);
            } else {
                let rel = path.strip_prefix(base).unwrap().to_path_buf();
                out.insert(rel, fs::read(&path).unwrap());
            }
        }
    }

    let mut out = BTreeMap::new();
    if dir.is_dir() {
        walk(dir, dir, &mut out);
    }
    out
}

async fn run(root: &Path, target: Target) -> sitepipe::errors::Result<()> {
    let ctx = real_context(root, ConfigFile::default());
    let pipeline = Pipeline::standard().unwrap();
    with_timeout(run_target(target, ctx, &pipeline)).await
}

/// Standard site with its development outputs compiled.
async fn compiled_site() -> TempDir {
    common::init_tracing();
    let tmp = tempfile::tempdir().unwrap();
    site::write_standard_site(tmp.path());
    for target in [Target::HtmlInclude, Target::Styles, Target::Scripts] {
        run(tmp.path(), target).await.unwrap();
    }
    tmp
}

#[tokio::test]
async fn development_targets_write_their_outputs() {
    let tmp = compiled_site().await;
    let app = tmp.path().join("app");

    let page = fs::read_to_string(app.join("index.html")).unwrap();
    assert!(page.contains("<h1>Home</h1>"), "include expanded: {page}");
    assert!(!page.contains("@@"));

    let expanded = fs::read_to_string(app.join("css/style.css")).unwrap();
    let compressed = fs::read_to_string(app.join("css/style.min.css")).unwrap();
    assert!(expanded.contains("#336699"));
    assert!(expanded.contains("body main"));
    assert!(compressed.len() < expanded.len());

    let bundle = fs::read_to_string(app.join("js/main.min.js")).unwrap();
    let source = fs::read_to_string(app.join("js/main.js")).unwrap();
    assert!(bundle.contains("greet"));
    assert!(bundle.len() < source.len());
}

#[tokio::test]
async fn build_produces_the_release_tree() {
    let tmp = compiled_site().await;
    run(tmp.path(), Target::Build).await.unwrap();

    let docs = tree(&tmp.path().join("docs"));
    let files: Vec<String> = docs
        .keys()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(
        files,
        vec![
            "css/style.css",
            "css/style.min.css",
            "img/logo.png",
            "index.html",
            "js/main.min.js",
        ]
    );

    let app = tmp.path().join("app");
    assert_eq!(docs[Path::new("img/logo.png")], site::PNG_BYTES);
    assert_eq!(
        docs[Path::new("js/main.min.js")],
        fs::read(app.join("js/main.min.js")).unwrap()
    );
}

#[tokio::test]
async fn build_is_idempotent() {
    let tmp = compiled_site().await;
    run(tmp.path(), Target::Build).await.unwrap();
    let first = tree(&tmp.path().join("docs"));

    run(tmp.path(), Target::Build).await.unwrap();
    let second = tree(&tmp.path().join("docs"));

    assert_eq!(first, second);
}

#[tokio::test]
async fn build_removes_stale_release_files() {
    let tmp = compiled_site().await;
    site::write_files(tmp.path(), &[("docs/old/stale.txt", b"stale")]);

    run(tmp.path(), Target::Build).await.unwrap();
    assert!(!tmp.path().join("docs/old").exists());
}

#[tokio::test]
async fn clean_of_a_missing_release_dir_succeeds() {
    let tmp = compiled_site().await;
    assert!(!tmp.path().join("docs").exists());

    // `build` starts with cleanDist on a tree that has no docs/ yet.
    run(tmp.path(), Target::Build).await.unwrap();
    assert!(tmp.path().join("docs/index.html").is_file());
}

#[tokio::test]
async fn build_without_compiled_bundle_fails_building_only() {
    common::init_tracing();
    let tmp = tempfile::tempdir().unwrap();
    site::write_standard_site(tmp.path());
    run(tmp.path(), Target::Styles).await.unwrap();

    let err = run(tmp.path(), Target::Build).await.unwrap_err();
    match err {
        SitepipeError::TasksFailed(failed) => assert_eq!(failed, vec!["building"]),
        other => panic!("expected TasksFailed, got {other:?}"),
    }
    // copyImages ran independently.
    assert!(tmp.path().join("docs/img/logo.png").is_file());
}

#[tokio::test]
async fn missing_style_entry_fails_the_styles_target() {
    common::init_tracing();
    let tmp = tempfile::tempdir().unwrap();
    site::write_files(tmp.path(), &[("app/js/main.js", b"let a = 1;")]);

    let err = run(tmp.path(), Target::Styles).await.unwrap_err();
    assert!(matches!(err, SitepipeError::TasksFailed(ref failed) if failed == &["styles"]));
    assert!(!tmp.path().join("app/css").exists());
}
