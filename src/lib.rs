pub mod cache;
pub mod classify;
pub mod cli;
pub mod error;
pub mod extensions;
pub mod filter;
pub mod git;
pub mod hotspot;
pub mod model;
pub mod output;
pub mod report;
pub mod run;
pub mod scan;
pub mod source;
pub mod trend;
pub mod util;

pub use classify::{is_bugfix, matches_keywords, passes_extension, BugfixMatcher};
pub use error::{HotspotError, Result};
pub use filter::{FilterConfig, FilterOptions};
pub use hotspot::{aggregate, Aggregation, HotspotQuery, HotspotReport};
pub use source::{CommitSource, MemorySource};
