//! Repository Implementations
//!
//! Load template documents and value sets from the local file system.

mod template;
mod tfvars;
mod value_set;

pub use template::FsTemplateStore;
pub use value_set::FsValueSetRepository;

use std::path::Path;

use crate::error::{StagecraftError, StagecraftResult};

/// Read a source file as UTF-8. Bytes that are not UTF-8 are a parse error
/// against the file, not an I/O failure.
fn read_source(path: &Path) -> StagecraftResult<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| StagecraftError::Parse {
        file: path.to_path_buf(),
        message: format!(
            "invalid UTF-8 at byte {}",
            e.utf8_error().valid_up_to()
        ),
    })
}
