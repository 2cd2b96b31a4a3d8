//! Pairwise interactive deletion.
//!
//! Each confirmed group is decomposed into pairs `(i, j)` with `i < j`, in
//! group order. Pairs where either file was already deleted are skipped, so
//! a group of three never asks about a file that is gone. Deletion happens
//! immediately after each answer; a failure is shown and logged and the
//! flow moves on to the next pair.
//!
//! When links are followed a group can hold a link next to the file it
//! resolves to. Deleting the link is allowed; deleting the file it points
//! at is refused while the link is still in the group.

use std::collections::HashSet;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use yansi::{Paint, Style};

use super::{Choice, ChoicePrompt, FileRemover, Notice};
use crate::duplicates::DuplicateGroup;

/// Outcome of an interactive session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractiveReport {
    /// Pairs shown to the user
    pub pairs_prompted: usize,
    /// Files removed, in deletion order
    pub deleted: Vec<PathBuf>,
    /// Deletions that failed
    pub failed: usize,
    /// Pairs where the user kept both files
    pub kept: usize,
    /// Deletions refused because a remaining link points at the file
    pub refused: usize,
}

/// Prompt for every duplicate pair and delete the chosen files.
///
/// # Errors
///
/// Returns an error only if the prompt itself fails (e.g. the terminal
/// closed). Deletion failures are reported through the prompt and counted.
pub fn run_interactive<P, R>(
    groups: &[DuplicateGroup],
    prompt: &mut P,
    remover: &mut R,
) -> io::Result<InteractiveReport>
where
    P: ChoicePrompt + ?Sized,
    R: FileRemover + ?Sized,
{
    let mut report = InteractiveReport::default();
    let mut deleted: HashSet<PathBuf> = HashSet::new();

    for group in groups {
        for (i, first) in group.paths.iter().enumerate() {
            for second in &group.paths[i + 1..] {
                if deleted.contains(first) {
                    break;
                }
                if deleted.contains(second) {
                    continue;
                }

                log::info!("Found duplicates: {} {}", first.display(), second.display());
                prompt.notify(&Notice::Duplicates(first.clone(), second.clone()))?;
                report.pairs_prompted += 1;

                let target = match prompt.choose(first, second)? {
                    Choice::DeleteFirst => first,
                    Choice::DeleteSecond => second,
                    Choice::KeepBoth => {
                        report.kept += 1;
                        continue;
                    }
                };

                if let Some(link) = linked_from(group, target, &deleted) {
                    log::warn!(
                        "Refusing to delete {}: {} links to it",
                        target.display(),
                        link.display()
                    );
                    report.refused += 1;
                    prompt.notify(&Notice::Refused(target.clone(), link.to_path_buf()))?;
                    continue;
                }

                match remover.remove(target) {
                    Ok(_) => {
                        deleted.insert(target.clone());
                        report.deleted.push(target.clone());
                        prompt.notify(&Notice::Deleted(target.clone()))?;
                    }
                    Err(e) => {
                        log::error!("Error deleting file {}: {} ({})", target.display(), e, e.kind());
                        report.failed += 1;
                        prompt.notify(&Notice::DeleteFailed(target.clone(), e.to_string()))?;
                    }
                }
            }
        }
    }

    Ok(report)
}

/// A remaining member of `group` that is a link resolving to `target`.
fn linked_from<'a>(
    group: &'a DuplicateGroup,
    target: &Path,
    deleted: &HashSet<PathBuf>,
) -> Option<&'a Path> {
    group
        .paths
        .iter()
        .filter(|member| member.as_path() != target && !deleted.contains(*member))
        .find(|member| {
            group
                .link_target(member)
                .is_some_and(|resolved| same_file(resolved, target))
        })
        .map(PathBuf::as_path)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Line-based terminal prompt.
///
/// Reads answers `1`, `2` or `3` from `input`; anything else is asked again.
/// End of input counts as "keep both".
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
    color: bool,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's stdin and stdout.
    #[must_use]
    pub fn stdio(color: bool) -> Self {
        Self::new(io::stdin().lock(), io::stdout(), color)
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    /// Create a prompt over arbitrary streams.
    #[must_use]
    pub fn new(input: R, output: W, color: bool) -> Self {
        Self {
            input,
            output,
            color,
        }
    }

    /// Consume the prompt and return its output stream.
    pub fn into_output(self) -> W {
        self.output
    }

    fn styled(&self, text: &str, style: Style) -> String {
        if self.color {
            text.paint(style).to_string()
        } else {
            text.to_string()
        }
    }
}

const HEADING: Style = Style::new().bold();
const OK: Style = Style::new().green();
const FAILED: Style = Style::new().red().bold();

impl<R: BufRead, W: Write> ChoicePrompt for TerminalPrompt<R, W> {
    fn choose(&mut self, first: &Path, second: &Path) -> io::Result<Choice> {
        loop {
            let question = self.styled("Which file should be deleted?", HEADING);
            writeln!(self.output, "{question}")?;
            writeln!(self.output, "  1) {}", first.display())?;
            writeln!(self.output, "  2) {}", second.display())?;
            writeln!(self.output, "  3) Keep both files")?;
            write!(self.output, "> ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(Choice::KeepBoth);
            }

            match line.trim() {
                "1" => return Ok(Choice::DeleteFirst),
                "2" => return Ok(Choice::DeleteSecond),
                "3" => return Ok(Choice::KeepBoth),
                other => writeln!(self.output, "Invalid choice '{other}', enter 1, 2 or 3")?,
            }
        }
    }

    fn notify(&mut self, notice: &Notice) -> io::Result<()> {
        let line = match notice {
            Notice::Duplicates(a, b) => format!(
                "{} {}|{}",
                self.styled("Duplicates:", HEADING),
                a.display(),
                b.display()
            ),
            Notice::Deleted(path) => {
                format!("{} {}", self.styled("Deleted:", OK), path.display())
            }
            Notice::DeleteFailed(path, message) => format!(
                "{} {}: {}",
                self.styled("Error deleting file", FAILED),
                path.display(),
                message
            ),
            Notice::Refused(path, link) => format!(
                "{} {}: {} links to it",
                self.styled("Refusing to delete", FAILED),
                path.display(),
                link.display()
            ),
        };
        writeln!(self.output, "{line}")
    }
}
