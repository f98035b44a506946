//! Handler for `depsys diff`.

use std::path::Path;

use miette::Result;

pub fn exec(old: &Path, new: &Path) -> Result<()> {
    depsys_ops::ops_diff::diff(old, new)
}
