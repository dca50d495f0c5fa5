//! Output for walker runs

use std::io;

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, NoColor, StandardStream, WriteColor};

use crate::provider::{TreeProvider, node_depth};
use crate::walker::{Phase, TreeWalker};

use super::config::OutputConfig;

/// One node returned by a walk, in visit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitRecord {
    pub label: String,
    pub key: String,
    pub phase: Phase,
    /// Depth below the provider's top node.
    pub depth: usize,
}

/// Drain `walker` into records. `describe` renders a node key for display.
pub fn collect_visits<P, F>(
    provider: &P,
    walker: TreeWalker<'_, P>,
    describe: F,
) -> Vec<VisitRecord>
where
    P: TreeProvider,
    F: Fn(&P::Key) -> String,
{
    walker
        .filter_map(|state| {
            let node = state.node?;
            Some(VisitRecord {
                label: provider.label(&node),
                key: describe(&provider.key(&node)),
                phase: state.phase,
                depth: node_depth(provider, &node),
            })
        })
        .collect()
}

pub struct WalkFormatter {
    config: OutputConfig,
}

impl WalkFormatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn format(&self, visits: &[VisitRecord]) -> String {
        let mut out = NoColor::new(Vec::new());
        // Writing into a Vec cannot fail.
        let _ = self.write_visits(visits, &mut out);
        String::from_utf8_lossy(&out.into_inner()).into_owned()
    }

    pub fn print(&self, visits: &[VisitRecord]) -> io::Result<()> {
        let choice = if self.config.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        let mut stdout = StandardStream::stdout(choice);
        self.write_visits(visits, &mut stdout)
    }

    fn write_visits<W: WriteColor>(&self, visits: &[VisitRecord], out: &mut W) -> io::Result<()> {
        let base = visits.iter().map(|v| v.depth).min().unwrap_or(0);
        for visit in visits {
            if self.config.show_phase {
                out.set_color(ColorSpec::new().set_fg(Some(phase_color(visit.phase))))?;
                write!(out, "{:<10}", visit.phase.as_str())?;
                out.reset()?;
                write!(out, " ")?;
            }
            let indent = "  ".repeat(visit.depth - base);
            writeln!(out, "{}{}", indent, visit.label)?;
        }
        writeln!(out)?;
        writeln!(out, "{} nodes visited", visits.len())?;
        Ok(())
    }
}

fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Initial => Color::White,
        Phase::Ancestor => Color::Yellow,
        Phase::Descendant | Phase::Leaf => Color::Green,
        Phase::Sibling => Color::Cyan,
        Phase::Other => Color::Magenta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaTree;
    use crate::walker::Direction;

    #[test]
    fn test_collect_and_format_visits() {
        let tree = ArenaTree::from_outline("1\n  2\n    3\n  4\n").unwrap();
        let start = tree.find("2").unwrap();
        let walker = TreeWalker::unrestricted(&tree, start, Direction::Forward);
        let visits = collect_visits(&tree, walker, |k| k.clone());

        let labels: Vec<&str> = visits.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["3", "4"]);
        assert_eq!(visits[0].phase, Phase::Descendant);
        assert_eq!(visits[0].depth, 2);

        let config = OutputConfig {
            use_color: false,
            show_phase: true,
        };
        let output = WalkFormatter::new(config).format(&visits);
        assert_eq!(output, "descendant   3\nother      4\n\n2 nodes visited\n");
    }
}
