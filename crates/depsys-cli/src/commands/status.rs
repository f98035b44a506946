//! Handler for `depsys status`.

use std::path::Path;

use miette::Result;

pub fn exec(file: &Path) -> Result<()> {
    depsys_ops::ops_status::status(file)
}
