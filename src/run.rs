use crate::cache::Cache;
use crate::cli::CommonArgs;
use crate::git::GitRepo;
use crate::hotspot::{aggregate, HotspotReport};
use crate::report::ReportMeta;
use anyhow::Context;
use console::style;
use tracing::{debug, info, warn};

pub struct Analysis {
    pub report: HotspotReport,
    pub meta: ReportMeta,
}

/// Opens the repository named in `common` and aggregates its history.
///
/// Returns `Ok(None)` when nothing qualified; callers must then skip all
/// output.
pub fn analyze(
    common: &CommonArgs,
    top: Option<usize>,
    time_series: bool,
    progress: bool,
) -> anyhow::Result<Option<Analysis>> {
    let query = common.query(top, time_series);
    let filters = query
        .filters
        .validate()
        .context("Invalid filter configuration")?;

    let mut repo = GitRepo::open(common.repo.as_ref())
        .context("Failed to open git repository")?
        .with_progress(progress);

    if let Some(dir) = &common.cache {
        let cache = Cache::new(dir).context("Failed to initialize cache")?;
        let cached_commits = cache.commit_count()?;
        debug!(cached_commits, "commit cache ready");
        repo = repo.with_cache(cache);
    }

    info!(
        repo = %repo.path().display(),
        extension = ?filters.extension(),
        keywords = ?filters.keywords(),
        "scanning history"
    );

    let outcome = aggregate(&repo, &query).context("Failed to aggregate commit history")?;
    let Some(report) = outcome.into_report() else {
        warn!("no file change passed the active filters");
        eprintln!("{}", style("No qualifying file changes found").yellow());
        return Ok(None);
    };

    info!(files = report.total_files, "aggregation complete");

    let meta = ReportMeta {
        repository_path: repo.path().to_string_lossy().to_string(),
        since: common.since.clone(),
        until: common.until.clone(),
        extension: filters.extension().map(str::to_string),
        keywords: filters.keywords().to_vec(),
    };

    Ok(Some(Analysis { report, meta }))
}
