// tests/select_props.rs

use std::path::Path;

use proptest::prelude::*;
use sitepipe::config::{Layout, PathsSection};
use sitepipe::fs::mock::MockFileSystem;
use sitepipe::select::FileSelector;

/// Paths below `app/html/`, possibly nested and under `includes/`.
fn template_path() -> impl Strategy<Value = String> {
    (
        prop::bool::ANY,
        prop::collection::vec("[a-z]{1,5}", 0..3),
        "[a-z]{1,6}",
        prop::sample::select(vec!["html", "htm", "css", "js", "txt"]),
    )
        .prop_map(|(includes, dirs, stem, ext)| {
            let mut path = String::from("app/html/");
            if includes {
                path.push_str("includes/");
            }
            for dir in dirs {
                path.push_str(&dir);
                path.push('/');
            }
            format!("{path}{stem}.{ext}")
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn release_selection_never_reaches_into_templates(
        templates in prop::collection::vec(template_path(), 0..12),
        pages in prop::collection::btree_set("[a-z]{1,6}", 0..5),
    ) {
        let fs = MockFileSystem::new();
        fs.add_file("./app/css/style.css", "a{}");
        fs.add_file("./app/css/style.min.css", "a{}");
        fs.add_file("./app/js/main.min.js", "1");
        for path in &templates {
            fs.add_file(format!("./{path}"), "<p/>");
        }
        for page in &pages {
            fs.add_file(format!("./app/{page}.html"), "<p/>");
        }

        let layout = Layout::new(".", &PathsSection::default());
        let sel = FileSelector::new(&layout.release_selection())
            .unwrap()
            .with_base(layout.app_rel());
        let selected: Vec<String> = sel
            .select(&fs, Path::new("."))
            .unwrap()
            .into_iter()
            .map(|f| f.relative.to_string_lossy().replace('\\', "/"))
            .collect();

        for rel in &selected {
            prop_assert!(!rel.starts_with("html/"), "selected {rel}");
        }
        let html_pages = selected.iter().filter(|r| r.ends_with(".html")).count();
        prop_assert_eq!(html_pages, pages.len());
    }
}
