use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::filter::{apply_filter, paginate};
use logscope_types::{ArcLogEntry, FilterSpec, LogEntry, LogLevel, Pagination};

/// The fetched log set and the views derived from it.
///
/// `all` is only ever replaced wholesale; `filtered` and `display` are
/// recomputed from it and share its entries.
#[derive(Clone, Debug, Default)]
pub struct LogView {
    all: Vec<ArcLogEntry>,
    filtered: Vec<ArcLogEntry>,
    display: Vec<ArcLogEntry>,
    filter: FilterSpec,
    pagination: Pagination,
    services: Vec<String>,
    sources: Vec<String>,
}

impl LogView {
    pub fn new(page_size: usize) -> Self {
        Self {
            pagination: Pagination::new(page_size),
            ..Default::default()
        }
    }

    /// Install a freshly fetched set. Clears the filter and goes back to page 1.
    pub fn replace(&mut self, entries: Vec<LogEntry>) {
        self.all = entries.into_iter().map(Arc::new).collect();
        self.filtered = self.all.clone();
        self.filter = FilterSpec::default();
        self.pagination.reset(self.all.len());
        self.services = distinct(self.all.iter().map(|e| e.service.as_str()));
        self.sources = distinct(self.all.iter().filter_map(|e| e.source.as_deref()));
        self.refresh_display();
        debug!(
            entries = self.all.len(),
            services = self.services.len(),
            sources = self.sources.len(),
            "log set replaced"
        );
    }

    /// Drop every view so nothing stale is shown
    pub fn clear(&mut self) {
        self.all.clear();
        self.filtered.clear();
        self.display.clear();
        self.filter = FilterSpec::default();
        self.pagination.reset(0);
        self.services.clear();
        self.sources.clear();
    }

    /// Filter the full set and go back to page 1
    pub fn apply_filter(&mut self, spec: FilterSpec) {
        self.filtered = apply_filter(&self.all, &spec);
        self.filter = spec;
        self.pagination.reset(self.filtered.len());
        self.refresh_display();
    }

    pub fn change_page(&mut self, page: usize, page_size: usize) {
        self.pagination.current = page;
        self.pagination.page_size = page_size;
        self.refresh_display();
    }

    fn refresh_display(&mut self) {
        self.display = paginate(
            &self.filtered,
            self.pagination.current,
            self.pagination.page_size,
        );
    }

    pub fn all(&self) -> &[ArcLogEntry] {
        &self.all
    }

    pub fn filtered(&self) -> &[ArcLogEntry] {
        &self.filtered
    }

    /// The current page of the filtered set
    pub fn display(&self) -> &[ArcLogEntry] {
        &self.display
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Distinct services in the fetched set, in first-seen order
    pub fn services(&self) -> &[String] {
        &self.services
    }

    /// Distinct sources in the fetched set, in first-seen order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Per-level counts of the filtered set
    pub fn level_counts(&self) -> LevelCounts {
        LevelCounts::tally(&self.filtered)
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Counts per log level
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelCounts {
    pub debug: usize,
    pub info: usize,
    pub warning: usize,
    pub error: usize,
}

impl LevelCounts {
    pub fn tally(entries: &[ArcLogEntry]) -> Self {
        let mut counts = Self::default();
        for entry in entries {
            match entry.level {
                LogLevel::Debug => counts.debug += 1,
                LogLevel::Info => counts.info += 1,
                LogLevel::Warning => counts.warning += 1,
                LogLevel::Error => counts.error += 1,
            }
        }
        counts
    }

    pub fn get(&self, level: LogLevel) -> usize {
        match level {
            LogLevel::Debug => self.debug,
            LogLevel::Info => self.info,
            LogLevel::Warning => self.warning,
            LogLevel::Error => self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: usize) -> Vec<LogEntry> {
        (0..n)
            .map(|i| {
                let level = if i % 3 == 0 { LogLevel::Error } else { LogLevel::Info };
                let mut e = LogEntry::new(
                    format!("log-{}", i),
                    "2024-01-15T10:00:00Z",
                    level,
                    if i % 2 == 0 { "auth" } else { "billing" },
                    format!("message {}", i),
                );
                e.source = Some(format!("10.0.0.{}", i % 4));
                e
            })
            .collect()
    }

    #[test]
    fn test_replace_resets_everything() {
        let mut view = LogView::new(10);
        view.replace(entries(25));
        view.apply_filter(FilterSpec {
            service: Some("auth".to_string()),
            ..Default::default()
        });
        view.change_page(2, 10);

        view.replace(entries(12));
        assert_eq!(view.all().len(), 12);
        assert_eq!(view.filtered().len(), 12);
        assert_eq!(view.display().len(), 10);
        assert!(view.filter().is_empty());
        assert_eq!(view.pagination(), Pagination { current: 1, page_size: 10, total: 12 });
    }

    #[test]
    fn test_facets_are_distinct_in_order() {
        let mut view = LogView::new(10);
        view.replace(entries(6));
        assert_eq!(view.services(), ["auth", "billing"]);
        assert_eq!(view.sources(), ["10.0.0.0", "10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    }

    #[test]
    fn test_filter_resets_to_first_page() {
        let mut view = LogView::new(5);
        view.replace(entries(20));
        view.change_page(3, 5);
        assert_eq!(view.display()[0].message, "message 10");

        view.apply_filter(FilterSpec {
            level: Some(LogLevel::Error),
            ..Default::default()
        });
        let pagination = view.pagination();
        assert_eq!(pagination.current, 1);
        assert_eq!(pagination.total, 7);
        assert_eq!(view.display().len(), 5);
        assert_eq!(view.level_counts(), LevelCounts { error: 7, ..Default::default() });
    }

    #[test]
    fn test_filter_never_touches_full_set() {
        let mut view = LogView::new(5);
        view.replace(entries(8));
        view.apply_filter(FilterSpec {
            search_text: Some("nothing matches this".to_string()),
            ..Default::default()
        });
        assert_eq!(view.all().len(), 8);
        assert!(view.filtered().is_empty());
        assert!(view.display().is_empty());
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let mut view = LogView::new(5);
        view.replace(entries(8));
        view.change_page(4, 5);
        assert!(view.display().is_empty());
        assert_eq!(view.pagination().current, 4);
    }

    #[test]
    fn test_clear() {
        let mut view = LogView::new(5);
        view.replace(entries(8));
        view.clear();
        assert!(view.is_empty());
        assert!(view.display().is_empty());
        assert!(view.services().is_empty());
        assert_eq!(view.pagination().total, 0);
    }

    #[test]
    fn test_level_counts_per_level() {
        let mut view = LogView::new(5);
        view.replace(entries(9));
        let counts = view.level_counts();
        assert_eq!(counts.get(LogLevel::Error), 3);
        assert_eq!(counts.get(LogLevel::Info), 6);
        assert_eq!(counts.get(LogLevel::Warning) + counts.get(LogLevel::Debug), 0);
    }
}
