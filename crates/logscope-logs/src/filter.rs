use logscope_types::{ArcLogEntry, FilterSpec, LogEntry, LogLevel, TimeWindow};

/// A filter spec prepared for matching many entries
#[derive(Clone, Debug)]
pub struct CompiledFilter<'a> {
    level: Option<LogLevel>,
    service: Option<&'a str>,
    source: Option<&'a str>,
    time_range: Option<TimeWindow>,
    /// Lower-cased search text
    needle: Option<String>,
}

impl<'a> CompiledFilter<'a> {
    pub fn new(spec: &'a FilterSpec) -> Self {
        Self {
            level: spec.level,
            // Whitespace-only values constrain nothing
            service: non_blank(spec.service.as_deref()),
            source: non_blank(spec.source.as_deref()),
            time_range: spec.time_range,
            needle: non_blank(spec.search_text.as_deref()).map(str::to_lowercase),
        }
    }

    /// Check if a log entry satisfies every specified constraint
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if self.level.is_some_and(|level| entry.level != level) {
            return false;
        }

        if self.service.is_some_and(|service| entry.service != service) {
            return false;
        }

        if self
            .source
            .is_some_and(|source| entry.source.as_deref() != Some(source))
        {
            return false;
        }

        if let Some(window) = &self.time_range {
            match entry.time() {
                Some(t) if window.contains(t) => {}
                _ => return false,
            }
        }

        match &self.needle {
            Some(needle) => entry.message.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }

    /// Check if filter is empty (matches everything)
    pub fn is_empty(&self) -> bool {
        self.level.is_none()
            && self.service.is_none()
            && self.source.is_none()
            && self.time_range.is_none()
            && self.needle.is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Stable, order-preserving subset of `all` matching `spec`
pub fn apply_filter(all: &[ArcLogEntry], spec: &FilterSpec) -> Vec<ArcLogEntry> {
    let filter = CompiledFilter::new(spec);
    if filter.is_empty() {
        return all.to_vec();
    }
    all.iter().filter(|entry| filter.matches(entry)).cloned().collect()
}

/// One page of `filtered`, with 1-based `page`.
///
/// Pages past the end, page 0 and a zero page size all yield an empty page.
pub fn paginate<T: Clone>(filtered: &[T], page: usize, page_size: usize) -> Vec<T> {
    if page == 0 || page_size == 0 {
        return Vec::new();
    }

    let start = (page - 1).saturating_mul(page_size);
    if start >= filtered.len() {
        return Vec::new();
    }
    let end = start.saturating_add(page_size).min(filtered.len());
    filtered[start..end].to_vec()
}

/// Number of pages needed to show `total` entries
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}
