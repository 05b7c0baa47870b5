// Business logic for the standings feature: which worksheet tabs exist, how
// a tab name resolves, and what "no data" means. No Discord or HTTP code
// here - the fetching itself lives behind the SheetSource trait so the core
// stays testable without the network.

use crate::core::table::SheetTable;
use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// One worksheet tab of the configured spreadsheet.
///
/// The `name` addresses the Sheets API (a range like `Overall Standings`),
/// while `gid` addresses the published-CSV export endpoint. Either may be
/// enough depending on which fetch path the source is configured for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTab {
    pub name: String,
    pub gid: Option<String>,
}

impl SheetTab {
    /// Parse a comma-separated tab list from configuration, e.g.
    /// `Overall Standings=2116993983,D1=0,D2`. The `=gid` part is optional;
    /// tabs without one can only be fetched through the Sheets API.
    pub fn parse_list(raw: &str) -> Vec<SheetTab> {
        raw.split(',')
            .filter_map(|entry| {
                let entry = entry.trim();
                if entry.is_empty() {
                    return None;
                }
                let (name, gid) = match entry.split_once('=') {
                    Some((name, gid)) => (name.trim(), Some(gid.trim().to_string())),
                    None => (entry, None),
                };
                Some(SheetTab {
                    name: name.to_string(),
                    gid: gid.filter(|g| !g.is_empty()),
                })
            })
            .collect()
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Failures while fetching sheet data. The parser itself is total; every
/// error here belongs to the transport or its configuration.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("sheet source is not configured: {0}")]
    NotConfigured(&'static str),
}

#[derive(Debug, Error)]
pub enum StandingsError {
    #[error("unknown sheet tab: {0}")]
    UnknownTab(String),

    #[error(transparent)]
    Source(#[from] SheetError),
}

// ============================================================================
// SOURCE TRAIT (PORT)
// ============================================================================

/// Where sheet data comes from. The infra layer implements this with a real
/// Google Sheets client; tests implement it with canned tables.
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_table(&self, tab: &SheetTab) -> Result<SheetTable, SheetError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Resolves tab names and fetches parsed tables through the injected source.
pub struct StandingsService<S: SheetSource> {
    source: S,
    tabs: Vec<SheetTab>,
}

impl<S: SheetSource> StandingsService<S> {
    pub fn new(source: S, tabs: Vec<SheetTab>) -> Self {
        Self { source, tabs }
    }

    pub fn tabs(&self) -> &[SheetTab] {
        &self.tabs
    }

    /// The tab used when a caller doesn't name one: the first configured.
    pub fn default_tab(&self) -> Option<&SheetTab> {
        self.tabs.first()
    }

    /// Case-insensitive tab lookup.
    pub fn find_tab(&self, name: &str) -> Option<&SheetTab> {
        self.tabs
            .iter()
            .find(|tab| tab.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Fetch and parse one tab. `None` selects the default tab.
    ///
    /// An empty table is a valid result, not an error - callers decide
    /// whether to show "no data" or an empty listing.
    pub async fn get_table(
        &self,
        name: Option<&str>,
    ) -> Result<(SheetTab, SheetTable), StandingsError> {
        let tab = match name {
            Some(name) => self
                .find_tab(name)
                .ok_or_else(|| StandingsError::UnknownTab(name.to_string()))?,
            None => self
                .default_tab()
                .ok_or(StandingsError::Source(SheetError::NotConfigured(
                    "no sheet tabs configured",
                )))?,
        };

        let table = self.source.fetch_table(tab).await?;
        Ok((tab.clone(), table))
    }
}
