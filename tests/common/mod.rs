#![allow(dead_code)]

pub use reloadwatch_test_utils::builders;
pub use reloadwatch_test_utils::{init_tracing, with_timeout};

use std::sync::Arc;

use reloadwatch::container::ContainerRuntime;
use reloadwatch::fs::mock::MockFileSystem;
use reloadwatch::fs::FileSystem;
use reloadwatch::watch::{HashAlgorithm, Salt};
use reloadwatch_test_utils::fake_runtime::FakeContainerRuntime;

/// Deterministic salt of the right length for `algorithm`.
pub fn fixed_salt(algorithm: HashAlgorithm) -> Salt {
    Salt::from_bytes(
        (0..algorithm.block_size())
            .map(|i| i as u8)
            .collect::<Vec<u8>>(),
    )
}

pub fn as_fs(fs: &MockFileSystem) -> Arc<dyn FileSystem> {
    Arc::new(fs.clone())
}

pub fn as_runtime(rt: &FakeContainerRuntime) -> Arc<dyn ContainerRuntime> {
    Arc::new(rt.clone())
}
