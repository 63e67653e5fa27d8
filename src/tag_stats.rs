/// Counts how many looked-up elements were present while walking a page.
///
/// Extractors thread every optional lookup through [`TagStats::check`], so a
/// page that silently lost half its markup shows up in the log report instead
/// of only as a shorter result list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagStats {
    pub found: usize,
    pub missing: usize,
    pub skipped_entries: usize,
}

impl TagStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check<T>(&mut self, lookup: Option<T>) -> Option<T> {
        match lookup {
            Some(_) => self.found += 1,
            None => self.missing += 1,
        }
        lookup
    }

    /// Records the outcome of one entry (row, panel, interval).
    pub fn entry<T>(&mut self, parsed: Option<T>) -> Option<T> {
        if parsed.is_none() {
            self.skipped_entries += 1;
        }
        parsed
    }

    pub fn total(&self) -> usize {
        self.found + self.missing
    }

    pub fn report(&self) -> String {
        let total = self.total();
        if total == 0 {
            return "No tags were checked".to_string();
        }
        if self.missing == 0 && self.skipped_entries == 0 {
            return "Tag validation stats: all tags were valid".to_string();
        }
        let percent = |n: usize| n as f64 / total as f64 * 100.0;
        format!(
            "Tag validation stats: checked {}, found {} ({:.1}%), missing {} ({:.1}%), skipped entries {}",
            total,
            self.found,
            percent(self.found),
            self.missing,
            percent(self.missing),
            self.skipped_entries
        )
    }
}
