//! # Tree Command Implementation
//!
//! This module implements the `tree` subcommand, which displays the nested
//! submodule hierarchy: the repository root, the submodules of its
//! descriptor, and for every clone the submodules of the clone's own
//! descriptor.
//!
//! This command is a safe, read-only operation that does not modify any files.

use std::borrow::Cow;
use std::io;

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, Style, TreeItem};

use git_submodules::workspace::{DescriptorTree, Workspace};

use crate::cli::Context;

/// Display the nested submodule tree
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Maximum depth to display in the tree.
    ///
    /// If not specified, displays the full tree. Use 1 to show only the
    /// submodules of the root descriptor.
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,
}

/// Execute the `tree` command.
pub fn execute(ctx: &Context, args: TreeArgs) -> Result<()> {
    let workspace = Workspace::open(&ctx.root)?;
    let tree = workspace.tree(args.depth)?;

    print_tree(&TreeView {
        tree: &tree,
        index: 0,
    })
    .map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;

    Ok(())
}

/// A node of a [`DescriptorTree`] as ptree sees it.
#[derive(Clone)]
struct TreeView<'a> {
    tree: &'a DescriptorTree,
    index: usize,
}

impl TreeView<'_> {
    fn label(&self) -> String {
        let node = self.tree.node(self.index);
        if self.index == 0 {
            return node.path.clone();
        }

        let mut label = format!("{} ({})", node.path, node.target);
        if !node.enabled {
            label.push_str(" [disabled]");
        }
        if !node.cloned {
            label.push_str(" [not cloned]");
        }
        label
    }
}

impl TreeItem for TreeView<'_> {
    type Child = Self;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &Style) -> io::Result<()> {
        write!(f, "{}", self.label())
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        let children = self
            .tree
            .node(self.index)
            .children
            .iter()
            .map(|&index| TreeView {
                tree: self.tree,
                index,
            })
            .collect::<Vec<_>>();
        Cow::Owned(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git_submodules::workspace::TreeNode;

    fn tree() -> DescriptorTree {
        DescriptorTree {
            nodes: vec![
                TreeNode {
                    path: "/work".to_string(),
                    enabled: true,
                    target: String::new(),
                    cloned: true,
                    children: vec![1, 2],
                },
                TreeNode {
                    path: "lib/x".to_string(),
                    enabled: true,
                    target: "branch main".to_string(),
                    cloned: true,
                    children: vec![],
                },
                TreeNode {
                    path: "lib/y".to_string(),
                    enabled: false,
                    target: "commit".to_string(),
                    cloned: false,
                    children: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_labels() {
        let tree = tree();
        let root = TreeView {
            tree: &tree,
            index: 0,
        };
        assert_eq!(root.label(), "/work");

        let children = root.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].label(), "lib/x (branch main)");
        assert_eq!(
            children[1].label(),
            "lib/y (commit) [disabled] [not cloned]"
        );
    }

    #[test]
    fn test_write_self() {
        let tree = tree();
        let view = TreeView {
            tree: &tree,
            index: 1,
        };
        let mut out = Vec::new();
        view.write_self(&mut out, &Style::default()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "lib/x (branch main)");
    }
}
