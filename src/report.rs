use std::fmt;

/// What happened to a single level file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Updated,
    Skipped,
}

/// Summary of one job run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub updated: Vec<String>,
    pub skipped: Vec<String>,
    /// Targets that were requested but not found on disk.
    pub missing: Vec<String>,
    /// Successful translator calls made during the run.
    pub translations: usize,
}

impl RunReport {
    pub fn record(&mut self, name: String, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Updated => self.updated.push(name),
            FileOutcome::Skipped => self.skipped.push(name),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} updated, {} skipped, {} missing, {} translations",
            self.updated.len(),
            self.skipped.len(),
            self.missing.len(),
            self.translations
        )
    }
}
