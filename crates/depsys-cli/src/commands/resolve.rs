//! Handler for `depsys resolve`.

use std::path::{Path, PathBuf};

use miette::Result;

use depsys_ops::ops_resolve::{self, ResolveOptions};

pub fn exec(file: &Path, json: bool, no_delta: bool, config: Option<PathBuf>) -> Result<()> {
    let opts = ResolveOptions {
        json,
        no_delta,
        config,
    };
    ops_resolve::resolve(file, &opts)
}
