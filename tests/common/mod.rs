// tests/common/mod.rs

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use sitepipe::config::{ConfigFile, Layout};
use sitepipe::fs::mock::MockFileSystem;
use sitepipe::fs::RealFileSystem;
use sitepipe::tasks::TaskContext;

pub use sitepipe_test_utils::builders;
pub use sitepipe_test_utils::fake_executor::FakeExecutor;
pub use sitepipe_test_utils::site;
pub use sitepipe_test_utils::{init_tracing, with_timeout};

/// Task context over the real filesystem rooted at `root`.
pub fn real_context(root: &Path, config: ConfigFile) -> Arc<TaskContext> {
    let layout = Layout::new(root, &config.paths);
    Arc::new(TaskContext::new(Arc::new(RealFileSystem), layout, config))
}

/// Task context over an in-memory filesystem rooted at `.`.
pub fn mock_context(fs: &MockFileSystem) -> TaskContext {
    let config = ConfigFile::default();
    let layout = Layout::new(".", &config.paths);
    TaskContext::new(Arc::new(fs.clone()), layout, config)
}
