// tests/html_include.rs

mod common;

use std::path::{Path, PathBuf};

use common::mock_context;
use sitepipe::errors::SitepipeError;
use sitepipe::fs::mock::MockFileSystem;
use sitepipe::fs::FileSystem;
use sitepipe::pipeline::TaskKind;
use sitepipe::server::ReloadMessage;
use sitepipe::tasks::run_one_shot;

fn read(fs: &MockFileSystem, path: &str) -> String {
    fs.read_to_string(Path::new(path)).unwrap()
}

#[test]
fn templates_are_expanded_into_the_app_dir() {
    common::init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file(
        "./app/html/index.html",
        "<body>@@include('includes/header.html', {\"title\": \"Home\"})<main/></body>",
    );
    fs.add_file("./app/html/about.html", "<body>@@include('includes/header.html')</body>");
    fs.add_file("./app/html/includes/header.html", "<h1>@@title</h1>@@include('nav.html')");
    fs.add_file("./app/html/includes/nav.html", "<nav/>");

    let ctx = mock_context(&fs);
    run_one_shot(TaskKind::HtmlInclude, &ctx).unwrap();

    assert_eq!(read(&fs, "./app/index.html"), "<body><h1>Home</h1><nav/><main/></body>");
    // Without variables the marker stays.
    assert_eq!(read(&fs, "./app/about.html"), "<body><h1>@@title</h1><nav/></body>");
    // Partials are not pages.
    assert!(!fs.exists(Path::new("./app/header.html")));
    assert!(!fs.exists(Path::new("./app/includes/header.html")));
}

#[test]
fn includes_resolve_relative_to_the_including_file() {
    let fs = MockFileSystem::new();
    fs.add_file("./app/html/index.html", "@@include('parts/a.html')");
    fs.add_file("./app/html/parts/a.html", "a@@include('../shared/b.html')");
    fs.add_file("./app/html/shared/b.html", "b");

    let ctx = mock_context(&fs);
    run_one_shot(TaskKind::HtmlInclude, &ctx).unwrap();
    assert_eq!(read(&fs, "./app/index.html"), "ab");
}

#[test]
fn missing_include_fails_only_that_page() {
    let fs = MockFileSystem::new();
    fs.add_file("./app/html/broken.html", "@@include('nope.html')");
    fs.add_file("./app/html/index.html", "fine");

    let ctx = mock_context(&fs);
    let err = run_one_shot(TaskKind::HtmlInclude, &ctx).unwrap_err();

    match err {
        SitepipeError::IncludeNotFound { target, from } => {
            assert_eq!(target, PathBuf::from("./app/html/nope.html"));
            assert_eq!(from, PathBuf::from("./app/html/broken.html"));
        }
        other => panic!("expected IncludeNotFound, got {other:?}"),
    }
    assert_eq!(read(&fs, "./app/index.html"), "fine");
    assert!(!fs.exists(Path::new("./app/broken.html")));
}

#[test]
fn include_cycles_are_detected() {
    let fs = MockFileSystem::new();
    fs.add_file("./app/html/index.html", "@@include('a.html')");
    fs.add_file("./app/html/a.html", "@@include('b.html')");
    fs.add_file("./app/html/b.html", "@@include('./a.html')");

    let ctx = mock_context(&fs);
    let err = run_one_shot(TaskKind::HtmlInclude, &ctx).unwrap_err();
    assert!(
        matches!(err, SitepipeError::IncludeCycle(ref path) if path == Path::new("./app/html/a.html")),
        "got {err:?}"
    );
}

#[test]
fn each_written_page_requests_a_reload() {
    let fs = MockFileSystem::new();
    fs.add_file("./app/html/index.html", "a");
    fs.add_file("./app/html/contact.html", "b");

    let ctx = mock_context(&fs);
    let mut rx = ctx.reload.subscribe();
    run_one_shot(TaskKind::HtmlInclude, &ctx).unwrap();

    assert_eq!(rx.try_recv().unwrap(), ReloadMessage::Reload);
    assert_eq!(rx.try_recv().unwrap(), ReloadMessage::Reload);
    assert!(rx.try_recv().is_err());
}

#[test]
fn no_templates_is_not_an_error() {
    let fs = MockFileSystem::new();
    fs.add_file("./app/js/main.js", "1;");

    let ctx = mock_context(&fs);
    run_one_shot(TaskKind::HtmlInclude, &ctx).unwrap();
}
