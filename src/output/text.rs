//! Human-readable terminal report.
//!
//! The layout follows the classic results block: a title naming the
//! strategy, the scan parameters, counts and timing, then each duplicate
//! group with its original marked, then any recoverable errors.

use std::io::{self, Write};
use std::path::PathBuf;

use bytesize::ByteSize;
use yansi::{Paint, Style};

use crate::duplicates::DuplicateAnalysis;
use crate::scanner::{HashAlgorithm, MaxDepth, ScanResult};

const TITLE: Style = Style::new().bright_white().bold();
const SOURCE: Style = Style::new().bright_cyan();
const BACKUP: Style = Style::new().bright_yellow();
const DEPTH: Style = Style::new().bright_magenta();
const COUNT: Style = Style::new().bright_green();
const ORIGINAL: Style = Style::new().green();
const DUPLICATE: Style = Style::new().yellow();
const ERROR: Style = Style::new().red();
const DIM: Style = Style::new().dim();

/// Text report over one scan and its analysis.
pub struct TextReport<'a> {
    result: &'a ScanResult,
    analysis: &'a DuplicateAnalysis,
    backup_folder: Option<PathBuf>,
    max_depth: MaxDepth,
    algorithm: HashAlgorithm,
    list_files: bool,
    color: bool,
}

impl<'a> TextReport<'a> {
    /// Create a report. Colors are on by default.
    #[must_use]
    pub fn new(result: &'a ScanResult, analysis: &'a DuplicateAnalysis) -> Self {
        Self {
            result,
            analysis,
            backup_folder: None,
            max_depth: MaxDepth::Unlimited,
            algorithm: HashAlgorithm::default(),
            list_files: false,
            color: true,
        }
    }

    /// Show the configured backup folder.
    #[must_use]
    pub fn with_backup_folder(mut self, folder: Option<PathBuf>) -> Self {
        self.backup_folder = folder;
        self
    }

    /// Show the depth limit used for the scan.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: MaxDepth) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Show the digest algorithm used for the scan.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// List every record, not just duplicates.
    #[must_use]
    pub fn with_list_files(mut self, list_files: bool) -> Self {
        self.list_files = list_files;
        self
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn paint(&self, text: impl std::fmt::Display, style: Style) -> String {
        if self.color {
            text.to_string().paint(style).to_string()
        } else {
            text.to_string()
        }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let result = self.result;
        let analysis = self.analysis;

        let title = format!("{} Results:", title_case(&result.strategy().to_string()));
        writeln!(w, "{}", self.paint(title, TITLE))?;
        let source = format!("Source Folder: {}", result.root().display());
        writeln!(w, "{}", self.paint(source, SOURCE))?;
        let backup = self
            .backup_folder
            .as_ref()
            .map_or_else(|| "(none)".to_string(), |p| p.display().to_string());
        writeln!(w, "{}", self.paint(format!("Backup Folder: {backup}"), BACKUP))?;
        writeln!(w, "{}", self.paint(format!("Max Scan Depth: {}", self.max_depth), DEPTH))?;
        writeln!(w, "Algorithm: {}", self.algorithm)?;
        writeln!(w, "{}", self.paint(format!("File Count: {}", result.len()), COUNT))?;
        writeln!(w, "Total Size: {}", ByteSize::b(result.total_size()))?;
        writeln!(
            w,
            "Duplicates: {} files in {} groups ({} reclaimable)",
            self.paint(analysis.duplicate_files, COUNT),
            analysis.groups.len(),
            ByteSize::b(analysis.wasted_space())
        )?;
        writeln!(w, "Time Elapsed: {:.2}s", result.duration().as_secs_f64())?;

        if self.list_files {
            writeln!(w)?;
            for record in result.records() {
                let file = format!("File: {}", record.path.display());
                writeln!(w, "{}", self.paint(file, SOURCE))?;
                let fingerprint = format!("Fingerprint: {}", record.fingerprint);
                writeln!(w, "{}", self.paint(fingerprint, BACKUP))?;
                writeln!(w, "{}", self.paint("------------------------", DIM))?;
            }
        }

        for (idx, group) in analysis.groups.iter().enumerate() {
            writeln!(w)?;
            writeln!(
                w,
                "Group {} [{}] {} x {}",
                idx + 1,
                group.fingerprint.short(12),
                group.len(),
                ByteSize::b(group.size())
            )?;
            writeln!(
                w,
                "  {} {}",
                self.paint("[original]", ORIGINAL),
                group.original().path.display()
            )?;
            for dup in group.duplicates() {
                writeln!(
                    w,
                    "  {} {}",
                    self.paint("[duplicate]", DUPLICATE),
                    dup.path.display()
                )?;
            }
        }

        if result.has_errors() {
            writeln!(w)?;
            let heading = format!("{} entries could not be read:", result.errors().len());
            writeln!(w, "{}", self.paint(heading, ERROR))?;
            for err in result.errors() {
                writeln!(w, "  {err}")?;
            }
        }

        Ok(())
    }

    /// Render the report to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One line per strategy for `--compare` runs.
#[must_use]
pub fn comparison_line(result: &ScanResult) -> String {
    format!(
        "Time Elapsed ({}): {:.2}s, {} files",
        result.strategy(),
        result.duration().as_secs_f64(),
        result.len()
    )
}
