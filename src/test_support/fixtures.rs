//! Registry index fixtures.

use std::path::{Path, PathBuf};

/// A small index covering every classification outcome.
///
/// Reverse dependencies of `zlib` on `x86_64-linux`: `curl`, `libpng`, and
/// `openssl`. With broken packages allowed, also `old-zip` and `needs-broken`.
pub const SAMPLE_INDEX: &str = r#"
[packages.zlib]
build-inputs = []
meta = { description = "compression library" }

[packages.openssl]
build-inputs = ["zlib"]
meta = {}

[packages.curl]
build-inputs = ["zlib", "openssl"]
meta = { platforms = ["x86_64-linux", "aarch64-darwin"] }

[packages.libpng]
build-inputs = ["zlib"]
meta = { broken = false }

[packages.old-zip]
build-inputs = ["zlib"]
meta = { broken = true }

[packages.darwin-tool]
build-inputs = ["zlib"]
meta = { platforms = ["aarch64-darwin"] }

[packages.hydra-skip]
build-inputs = ["zlib"]
meta = { hydra-platforms = "none" }

[packages.nowhere]
build-inputs = ["zlib"]
meta = { platforms = [] }

[packages.needs-broken]
build-inputs = ["zlib", "old-zip"]
meta = {}

[packages.undocumented]
build-inputs = ["zlib"]

[packages.opaque]
meta = {}

[packages.pythonPackages]
kind = "attribute set"

[packages.bad]
error = "attribute 'src' missing"
"#;

/// Write `contents` to `<dir>/registry.toml` and return the path.
pub fn write_index(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("registry.toml");
    std::fs::write(&path, contents).unwrap();
    path
}
