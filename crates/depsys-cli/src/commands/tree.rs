//! Handler for `depsys tree`.

use std::path::Path;

use miette::Result;

use depsys_ops::ops_tree::{self, TreeOptions};

pub fn exec(file: &Path, depth: Option<usize>, inverted: bool, why: Option<String>) -> Result<()> {
    let opts = TreeOptions {
        depth,
        inverted,
        why,
    };
    ops_tree::tree(file, &opts)
}
