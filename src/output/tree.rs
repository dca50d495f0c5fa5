//! Tree formatter for UI trees
//!
//! Renders the visible part of a `UiTree` with box-drawing connectors:
//! children are shown only below expanded items, and collapsed items that
//! have (or may have) children are marked with `[+]`.

use std::io;

use termcolor::{Color, ColorChoice, ColorSpec, NoColor, StandardStream, WriteColor};

use crate::provider::NodeKind;
use crate::reconcile::{ItemId, UiTree};

use super::config::OutputConfig;

const COLLAPSED_MARKER: &str = " [+]";

/// Formatter for buffered tree output.
pub struct TreeFormatter {
    config: OutputConfig,
}

struct Counts {
    shown: usize,
    expanded: usize,
}

impl TreeFormatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn format<K>(&self, tree: &UiTree<K>) -> String {
        let mut out = NoColor::new(Vec::new());
        // Writing into a Vec cannot fail.
        let _ = self.write_tree(tree, &mut out);
        String::from_utf8_lossy(&out.into_inner()).into_owned()
    }

    pub fn print<K>(&self, tree: &UiTree<K>) -> io::Result<()> {
        let choice = if self.config.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        let mut stdout = StandardStream::stdout(choice);
        self.write_tree(tree, &mut stdout)
    }

    fn write_tree<K, W: WriteColor>(&self, tree: &UiTree<K>, out: &mut W) -> io::Result<()> {
        let mut counts = Counts {
            shown: 0,
            expanded: 0,
        };
        self.write_item(tree, tree.root(), out, "", true, true, &mut counts)?;
        writeln!(out)?;
        writeln!(
            out,
            "{} items, {} expanded",
            counts.shown, counts.expanded
        )?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn write_item<K, W: WriteColor>(
        &self,
        tree: &UiTree<K>,
        id: ItemId,
        out: &mut W,
        prefix: &str,
        is_last: bool,
        is_root: bool,
        counts: &mut Counts,
    ) -> io::Result<()> {
        let Some(item) = tree.get(id) else {
            return Ok(());
        };
        counts.shown += 1;
        if item.is_expanded() {
            counts.expanded += 1;
        }

        if !is_root {
            let connector = if is_last { "└── " } else { "├── " };
            write!(out, "{}{}", prefix, connector)?;
        }

        let color = match item.kind() {
            NodeKind::GrandRoot => Color::Magenta,
            NodeKind::Directory => Color::Blue,
        };
        out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(is_root))?;
        write!(out, "{}", item.label())?;
        out.reset()?;

        let expandable = item.has_children() || item.may_have_children();
        if !item.is_expanded() && expandable {
            write!(out, "{}", COLLAPSED_MARKER)?;
        }
        writeln!(out)?;

        if !item.is_expanded() {
            return Ok(());
        }

        let child_prefix = if is_root {
            String::new()
        } else if is_last {
            format!("{}    ", prefix)
        } else {
            format!("{}│   ", prefix)
        };
        let children = item.children();
        for (i, child) in children.iter().enumerate() {
            let child_is_last = i == children.len() - 1;
            self.write_item(tree, *child, out, &child_prefix, child_is_last, false, counts)?;
        }
        Ok(())
    }
}
