//! Sample site trees written to a real directory.

use std::fs;
use std::path::Path;

pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0x0d, 0xff, 0x00];

/// Write `files` (root-relative path, contents) under `root`.
pub fn write_files(root: &Path, files: &[(&str, &[u8])]) {
    for (rel, contents) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
    }
}

/// A complete `app/` tree: one template with an include, a stylesheet with
/// a partial, the entry script and one image.
pub fn write_standard_site(root: &Path) {
    write_files(
        root,
        &[
            (
                "app/html/index.html",
                b"<html><body>@@include('includes/header.html', {\"title\": \"Home\"})<main>hi</main></body></html>\n",
            ),
            ("app/html/includes/header.html", b"<h1>@@title</h1>"),
            ("app/scss/_vars.scss", b"$accent: #336699;\n"),
            (
                "app/scss/style.scss",
                b"@import 'vars';\n\nbody {\n  color: $accent;\n\n  main {\n    margin: 0 auto;\n  }\n}\n",
            ),
            ("app/js/main.js", b"const greeting = 'hi';\n\nfunction greet() {\n  console.log(greeting);\n}\n\ngreet();\n"),
            ("app/img/logo.png", PNG_BYTES),
        ],
    );
}
