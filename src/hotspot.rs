//! Folding a commit history into per-file modification and bugfix counts.

use crate::classify::{matches_keywords, passes_extension, BugfixMatcher};
use crate::error::Result;
use crate::filter::FilterOptions;
use crate::model::{ExtensionStats, FileStat, MonthBucket};
use crate::source::CommitSource;
use crate::util::{extension_key, month_key};
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_TOP: usize = 10;

/// Everything one aggregation run needs besides the history itself.
#[derive(Debug, Clone, Default)]
pub struct HotspotQuery {
    pub filters: FilterOptions,
    pub bugfix: BugfixMatcher,
    /// Keep only the first `top` ranked files. `None` keeps all of them.
    pub top: Option<usize>,
    pub time_series: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotspotReport {
    /// Ranked by bugfixes, then modifications, both descending.
    pub entries: Vec<FileStat>,
    /// Number of distinct files before truncation.
    pub total_files: usize,
    pub months: Option<Vec<MonthBucket>>,
    /// Computed over every qualifying file, not only the truncated ranking.
    pub extensions: Vec<ExtensionStats>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregation {
    /// No (commit, file) pair passed the filters.
    Empty,
    Hotspots(HotspotReport),
}

impl Aggregation {
    pub fn into_report(self) -> Option<HotspotReport> {
        match self {
            Aggregation::Empty => None,
            Aggregation::Hotspots(report) => Some(report),
        }
    }
}

/// File counters in first-observation order.
#[derive(Debug, Default)]
struct HotspotTable {
    index: HashMap<String, usize>,
    stats: Vec<FileStat>,
}

impl HotspotTable {
    fn record(&mut self, path: &str, bugfix: bool) {
        let slot = match self.index.get(path) {
            Some(&slot) => slot,
            None => {
                self.stats.push(FileStat::new(path.to_string()));
                self.index.insert(path.to_string(), self.stats.len() - 1);
                self.stats.len() - 1
            }
        };
        self.stats[slot].record(bugfix);
    }

    fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Stable sort, so ties keep first-observation order.
    fn into_ranked(self) -> Vec<FileStat> {
        let mut stats = self.stats;
        stats.sort_by(|a, b| {
            b.bugfixes
                .cmp(&a.bugfixes)
                .then_with(|| b.modifications.cmp(&a.modifications))
        });
        stats
    }
}

/// Runs one pass over `source`.
///
/// The filters are validated before the source is touched, so a bad date
/// never starts a history walk. Any error from the source aborts the run.
pub fn aggregate<S>(source: &S, query: &HotspotQuery) -> Result<Aggregation>
where
    S: CommitSource + ?Sized,
{
    let config = query.filters.validate()?;

    let mut table = HotspotTable::default();
    let mut months: BTreeMap<String, (u64, u64)> = BTreeMap::new();

    for commit in source.commits(config.range())? {
        let commit = commit?;

        if !matches_keywords(&commit.message, config.keywords()) {
            continue;
        }
        let bugfix = query.bugfix.is_bugfix(&commit.message);

        for change in &commit.changes {
            let Some(path) = change.new_path.as_deref() else {
                continue;
            };
            if !passes_extension(path, config.extension()) {
                continue;
            }

            table.record(path, bugfix);

            if query.time_series {
                let bucket = months.entry(month_key(&commit.timestamp)).or_insert((0, 0));
                bucket.0 += 1;
                if bugfix {
                    bucket.1 += 1;
                }
            }
        }
    }

    if table.is_empty() {
        return Ok(Aggregation::Empty);
    }

    let ranked = table.into_ranked();
    let total_files = ranked.len();
    let extensions = extension_breakdown(&ranked);

    let entries = match query.top {
        Some(n) => ranked.into_iter().take(n).collect(),
        None => ranked,
    };

    let months = query.time_series.then(|| {
        months
            .into_iter()
            .map(|(month, (events, bugfix_events))| MonthBucket { month, events, bugfix_events })
            .collect()
    });

    Ok(Aggregation::Hotspots(HotspotReport { entries, total_files, months, extensions }))
}

/// Groups ranked entries by lower-cased extension, most bugfixes first.
pub fn extension_breakdown(entries: &[FileStat]) -> Vec<ExtensionStats> {
    let mut by_ext: HashMap<String, ExtensionStats> = HashMap::new();

    for stat in entries {
        let ext = extension_key(&stat.path);
        let entry = by_ext.entry(ext.clone()).or_insert_with(|| ExtensionStats {
            extension: ext,
            files: 0,
            modifications: 0,
            bugfixes: 0,
        });
        entry.files += 1;
        entry.modifications += stat.modifications;
        entry.bugfixes += stat.bugfixes;
    }

    let mut out: Vec<_> = by_ext.into_values().collect();
    out.sort_by(|a, b| {
        b.bugfixes
            .cmp(&a.bugfixes)
            .then_with(|| b.modifications.cmp(&a.modifications))
            .then_with(|| a.extension.cmp(&b.extension))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HotspotError;
    use crate::model::{Commit, DateRange, FileChange};
    use crate::source::{CommitIter, MemorySource};
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn commit(msg: &str, when: DateTime<Utc>, files: &[&str]) -> Commit {
        Commit {
            id: format!("{:x}", when.timestamp()),
            message: msg.to_string(),
            author_name: "Dev".to_string(),
            timestamp: when,
            changes: files.iter().map(|f| FileChange::modified(*f)).collect(),
        }
    }

    fn scenario() -> MemorySource {
        MemorySource::new(vec![
            commit("fix: null pointer", at(2024, 1, 10), &["a.py", "b.md"]),
            commit("add feature", at(2024, 2, 3), &["a.py"]),
        ])
    }

    fn stat(path: &str, modifications: u64, bugfixes: u64) -> FileStat {
        FileStat { path: path.to_string(), modifications, bugfixes }
    }

    fn report(source: &MemorySource, query: &HotspotQuery) -> HotspotReport {
        aggregate(source, query).unwrap().into_report().expect("non-empty result")
    }

    #[test]
    fn unfiltered_scenario_ranks_by_bugfixes_then_modifications() {
        let report = report(&scenario(), &HotspotQuery::default());
        assert_eq!(report.entries, vec![stat("a.py", 2, 1), stat("b.md", 1, 1)]);
        assert_eq!(report.total_files, 2);
        assert_eq!(report.months, None);
    }

    #[test]
    fn extension_filter_excludes_other_files() {
        let query = HotspotQuery {
            filters: FilterOptions { extension: Some(".py".to_string()), ..Default::default() },
            ..Default::default()
        };
        assert_eq!(report(&scenario(), &query).entries, vec![stat("a.py", 2, 1)]);
    }

    #[test]
    fn bare_and_dotted_extensions_are_equivalent() {
        let dotted = HotspotQuery {
            filters: FilterOptions { extension: Some(".py".to_string()), ..Default::default() },
            ..Default::default()
        };
        let bare = HotspotQuery {
            filters: FilterOptions { extension: Some("py".to_string()), ..Default::default() },
            ..Default::default()
        };
        assert_eq!(aggregate(&scenario(), &dotted).unwrap(), aggregate(&scenario(), &bare).unwrap());
    }

    #[test]
    fn keyword_filter_drops_whole_commits() {
        let query = HotspotQuery {
            filters: FilterOptions { keywords: vec!["fix".to_string()], ..Default::default() },
            ..Default::default()
        };
        assert_eq!(
            report(&scenario(), &query).entries,
            vec![stat("a.py", 1, 1), stat("b.md", 1, 1)]
        );
    }

    #[test]
    fn keyword_filter_excludes_matching_extension_files_too() {
        let source = MemorySource::new(vec![
            commit("docs: update readme", at(2024, 1, 1), &["readme.md", "tool.py"]),
            commit("fix: critical bug", at(2024, 1, 2), &["bug.py"]),
        ]);
        let query = HotspotQuery {
            filters: FilterOptions {
                extension: Some("py".to_string()),
                keywords: vec!["fix".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(report(&source, &query).entries, vec![stat("bug.py", 1, 1)]);
    }

    #[test]
    fn non_bugfix_commits_never_count_bugfixes() {
        let source = MemorySource::new(vec![
            commit("add feature", at(2024, 1, 1), &["a.rs"]),
            commit("refactor module", at(2024, 1, 2), &["a.rs", "b.rs"]),
        ]);
        let report = report(&source, &HotspotQuery::default());
        assert!(report.entries.iter().all(|s| s.bugfixes == 0));
        assert_eq!(report.entries[0], stat("a.rs", 2, 0));
    }

    #[test]
    fn deletions_are_never_counted() {
        let mut deleted = commit("remove old code", at(2024, 1, 1), &[]);
        deleted.changes = vec![FileChange::deleted("gone.py")];
        let source = MemorySource::new(vec![deleted]);

        assert_eq!(aggregate(&source, &HotspotQuery::default()).unwrap(), Aggregation::Empty);
    }

    #[test]
    fn renames_count_under_the_new_path() {
        let mut renamed = commit("fix path", at(2024, 1, 1), &[]);
        renamed.changes = vec![FileChange::renamed("old.rs", "new.rs"), FileChange::added("extra.rs")];
        let report = report(&MemorySource::new(vec![renamed]), &HotspotQuery::default());
        assert_eq!(report.entries, vec![stat("new.rs", 1, 1), stat("extra.rs", 1, 1)]);
    }

    #[test]
    fn empty_history_is_empty_result() {
        let source = MemorySource::new(Vec::new());
        let outcome = aggregate(&source, &HotspotQuery::default()).unwrap();
        assert_eq!(outcome, Aggregation::Empty);
        assert_eq!(outcome.into_report(), None);
    }

    #[test]
    fn no_matching_extension_is_empty_result() {
        let source = MemorySource::new(vec![commit("fix", at(2024, 1, 1), &["leia-me.txt"])]);
        let query = HotspotQuery {
            filters: FilterOptions { extension: Some(".py".to_string()), ..Default::default() },
            time_series: true,
            ..Default::default()
        };
        assert_eq!(aggregate(&source, &query).unwrap(), Aggregation::Empty);
    }

    #[test]
    fn invalid_since_fails_without_traversal() {
        let source = scenario();
        let query = HotspotQuery {
            filters: FilterOptions { since: Some("DATA-INVALIDA".to_string()), ..Default::default() },
            ..Default::default()
        };
        let err = aggregate(&source, &query).unwrap_err();
        assert!(matches!(err, HotspotError::Configuration(_)));
        assert_eq!(source.traversals(), 0);
    }

    #[test]
    fn invalid_until_fails_without_traversal() {
        let source = scenario();
        let query = HotspotQuery {
            filters: FilterOptions { until: Some("DATA-INVALIDA".to_string()), ..Default::default() },
            ..Default::default()
        };
        assert!(matches!(aggregate(&source, &query), Err(HotspotError::Configuration(_))));
        assert_eq!(source.traversals(), 0);
    }

    #[test]
    fn date_bounds_are_passed_to_the_source() {
        let source = scenario();
        let query = HotspotQuery {
            filters: FilterOptions {
                since: Some("2024-02-01".to_string()),
                until: Some("2024-02-03".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(report(&source, &query).entries, vec![stat("a.py", 1, 0)]);
        assert_eq!(source.traversals(), 1);
    }

    #[test]
    fn top_truncates_ranking_but_not_totals() {
        let query = HotspotQuery { top: Some(1), ..Default::default() };
        let report = report(&scenario(), &query);
        assert_eq!(report.entries, vec![stat("a.py", 2, 1)]);
        assert_eq!(report.total_files, 2);
        assert_eq!(report.extensions.len(), 2);
    }

    #[test]
    fn ties_keep_first_observation_order() {
        let source = MemorySource::new(vec![
            commit("touch", at(2024, 1, 1), &["z.rs", "a.rs", "m.rs"]),
        ]);
        let paths: Vec<String> = report(&source, &HotspotQuery::default())
            .entries
            .into_iter()
            .map(|s| s.path)
            .collect();
        assert_eq!(paths, vec!["z.rs", "a.rs", "m.rs"]);
    }

    #[test]
    fn bugfixes_never_exceed_modifications() {
        let messages = ["fix a", "feature", "bug b", "chore", "error c", "docs"];
        let files = [&["x.rs", "y.rs"][..], &["x.rs"][..], &["y.rs", "z.rs"][..]];
        let commits = messages
            .iter()
            .enumerate()
            .map(|(i, msg)| commit(msg, at(2024, 1, i as u32 + 1), files[i % files.len()]))
            .collect();
        let report = report(&MemorySource::new(commits), &HotspotQuery::default());
        for s in &report.entries {
            assert!(s.bugfixes <= s.modifications, "{s:?}");
        }
    }

    #[test]
    fn time_series_buckets_events_by_utc_month() {
        let source = MemorySource::new(vec![
            commit("fix: null pointer", at(2024, 1, 10), &["a.py", "b.md"]),
            commit("add feature", at(2024, 2, 3), &["a.py"]),
            commit("add more", at(2024, 1, 20), &["c.py"]),
        ]);
        let query = HotspotQuery { time_series: true, ..Default::default() };
        let months = report(&source, &query).months.unwrap();
        assert_eq!(
            months,
            vec![
                MonthBucket { month: "2024-01".to_string(), events: 3, bugfix_events: 2 },
                MonthBucket { month: "2024-02".to_string(), events: 1, bugfix_events: 0 },
            ]
        );
    }

    #[test]
    fn custom_bugfix_keywords_change_classification() {
        let query = HotspotQuery {
            bugfix: BugfixMatcher::with_keywords(["feature"]),
            ..Default::default()
        };
        let report = report(&scenario(), &query);
        assert_eq!(report.entries, vec![stat("a.py", 2, 1), stat("b.md", 1, 0)]);
    }

    #[test]
    fn extension_breakdown_groups_by_suffix() {
        let entries = vec![
            stat("src/a.py", 4, 2),
            stat("src/b.py", 1, 1),
            stat("README.md", 3, 0),
            stat("Makefile", 1, 0),
        ];
        let breakdown = extension_breakdown(&entries);
        assert_eq!(
            breakdown,
            vec![
                ExtensionStats { extension: ".py".to_string(), files: 2, modifications: 5, bugfixes: 3 },
                ExtensionStats { extension: ".md".to_string(), files: 1, modifications: 3, bugfixes: 0 },
                ExtensionStats { extension: "(none)".to_string(), files: 1, modifications: 1, bugfixes: 0 },
            ]
        );
    }

    struct FailingSource;

    impl CommitSource for FailingSource {
        fn commits<'a>(&'a self, _range: &DateRange) -> Result<CommitIter<'a>> {
            let items = vec![
                Ok(commit("fix", at(2024, 1, 1), &["a.rs"])),
                Err(HotspotError::RepositoryAccess("corrupt object".to_string())),
            ];
            Ok(Box::new(items.into_iter()))
        }
    }

    #[test]
    fn mid_traversal_failure_aborts_without_partial_table() {
        let err = aggregate(&FailingSource, &HotspotQuery::default()).unwrap_err();
        assert!(err.is_repository_access());
    }
}
