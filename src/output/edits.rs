//! Edit log output

use std::io;

use termcolor::{Color, ColorChoice, ColorSpec, NoColor, StandardStream, WriteColor};

use crate::reconcile::Edit;

use super::config::OutputConfig;

/// Prints structural edits as `+ key` / `- key` lines.
pub struct EditFormatter {
    config: OutputConfig,
}

impl EditFormatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn format<K>(&self, edits: &[Edit<K>], describe: impl Fn(&K) -> String) -> String {
        let mut out = NoColor::new(Vec::new());
        // Writing into a Vec cannot fail.
        let _ = self.write_edits(edits, &describe, &mut out);
        String::from_utf8_lossy(&out.into_inner()).into_owned()
    }

    pub fn print<K>(&self, edits: &[Edit<K>], describe: impl Fn(&K) -> String) -> io::Result<()> {
        let choice = if self.config.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        let mut stdout = StandardStream::stdout(choice);
        self.write_edits(edits, &describe, &mut stdout)
    }

    fn write_edits<K, W: WriteColor>(
        &self,
        edits: &[Edit<K>],
        describe: &dyn Fn(&K) -> String,
        out: &mut W,
    ) -> io::Result<()> {
        let (mut added, mut removed) = (0, 0);
        for edit in edits {
            let (sign, color) = match edit {
                Edit::Insert { .. } => {
                    added += 1;
                    ('+', Color::Green)
                }
                Edit::Remove { .. } => {
                    removed += 1;
                    ('-', Color::Red)
                }
                Edit::Keep { .. } => continue,
            };
            out.set_color(ColorSpec::new().set_fg(Some(color)))?;
            write!(out, "{} {}", sign, describe(edit.key()))?;
            out.reset()?;
            writeln!(out)?;
        }
        if added + removed == 0 {
            writeln!(out, "no changes")?;
        } else {
            writeln!(out, "{} added, {} removed", added, removed)?;
        }
        Ok(())
    }
}
