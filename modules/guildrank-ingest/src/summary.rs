/// Counts from one ingestion run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub captures_seen: u32,
    pub skipped_status: u32,
    pub skipped_empty: u32,
    pub skipped_duplicate: u32,
    pub failed: u32,
    pub emitted: u32,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} captures seen: {} emitted, {} non-200, {} empty, \
             {} duplicate, {} failed",
            self.captures_seen,
            self.emitted,
            self.skipped_status,
            self.skipped_empty,
            self.skipped_duplicate,
            self.failed,
        )
    }
}
