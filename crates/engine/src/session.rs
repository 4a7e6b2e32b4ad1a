//! # Session Controller
//!
//! Owns one discovery session: the active mode and filters, the effective
//! query derived from them, the data source that query is served from and
//! the paginator holding its results.
//!
//! ## Data source selection
//! - Browse mode, nothing filtered: default feed, remote cursor paging
//! - Browse mode with keywords or facets: search service, window paging
//! - Personalized mode: matches service narrowed by the active filters,
//!   window paging
//!
//! ## Stale responses
//! Every reset bumps `generation`. A fetch remembers the generation it was
//! dispatched under and its response is dropped if the session moved on in
//! the meantime, so a slow answer to an old query can never overwrite a
//! newer one.
//!
//! ## Cancellation
//! First-page and load-more fetches settle in their own task. Dropping the
//! future of `submit_search`, `load_more` and friends, or aborting a debounce
//! that already fired, never leaves the paginator stuck in a loading state.
//!
//! The state mutex is never held across an `.await`.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::interactions::InteractionStore;
use crate::pagination::{LoadMore, PageState, Paginator, StrategyKind};
use crate::recent::{RecentSearchEntry, RecentSearches};
use anyhow::Context;
use catalog::{JobListing, UserId};
use query::{EffectiveQuery, FilterPipeline, FilterState, QueryParser, merge};
use serde::Serialize;
use sources::{
    InteractionTracker, ListingStore, MatchesOutcome, MatchesService, SearchPage, SearchRequest,
    SearchService, SourceError, unix_now,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, instrument, warn};

const SUGGESTION_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    #[default]
    Browse,
    Personalized,
}

/// Where the session's results come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    DefaultFeed,
    Search,
    Matches,
}

impl DataSource {
    fn select(mode: SessionMode, effective: &EffectiveQuery) -> Self {
        match mode {
            SessionMode::Personalized => DataSource::Matches,
            SessionMode::Browse if effective.is_unfiltered() => DataSource::DefaultFeed,
            SessionMode::Browse => DataSource::Search,
        }
    }

    fn strategy(self) -> StrategyKind {
        match self {
            DataSource::DefaultFeed => StrategyKind::RemoteCursor,
            DataSource::Search | DataSource::Matches => StrategyKind::Window,
        }
    }
}

/// The remote services a session talks to
#[derive(Clone)]
pub struct Collaborators {
    pub search: Arc<dyn SearchService>,
    pub matches: Arc<dyn MatchesService>,
    pub store: Arc<dyn ListingStore>,
    pub tracker: Arc<dyn InteractionTracker>,
}

/// Snapshot of everything a front end renders
#[derive(Debug, Clone)]
pub struct SessionView {
    pub mode: SessionMode,
    pub source: DataSource,
    pub state: PageState,
    /// Visible listings with dismissed ones removed
    pub listings: Vec<JobListing>,
    /// Listings held by the session, revealed or not
    pub total_results: usize,
    pub has_more: bool,
    pub is_loading: bool,
    pub error: Option<EngineError>,
    pub load_more_error: Option<String>,
    pub profile_incomplete: bool,
    pub generation: u64,
    /// Selections the current results were loaded with
    pub filters: FilterState,
    /// Typed text still waiting for the debounce
    pub pending_query: Option<String>,
    pub effective_query: EffectiveQuery,
}

struct SessionState {
    mode: SessionMode,
    filters: FilterState,
    pending_query: Option<String>,
    effective: EffectiveQuery,
    source: DataSource,
    paginator: Paginator,
    generation: u64,
    error: Option<EngineError>,
    profile_incomplete: bool,
}

struct SessionInner {
    user_id: UserId,
    config: EngineConfig,
    parser: QueryParser,
    collaborators: Collaborators,
    interactions: InteractionStore,
    state: Mutex<SessionState>,
    recent: Mutex<RecentSearches>,
    debounce: Mutex<Option<JoinHandle<()>>>,
}

/// What a first-page fetch was dispatched with
struct Dispatch {
    generation: u64,
    source: DataSource,
    query_text: String,
    effective: EffectiveQuery,
}

enum FirstPage {
    Feed(SearchPage),
    Batch(Vec<JobListing>),
    ProfileIncomplete,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Run `work` as its own task so dropping the awaiting future cannot stop
/// it halfway. Runs inline when there is no tokio runtime.
async fn run_detached<F>(work: F) -> std::result::Result<(), JoinError>
where
    F: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => handle.spawn(work).await,
        Err(_) => {
            work.await;
            Ok(())
        }
    }
}

/// Drive a discovery session. Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<SessionInner>,
}

impl SessionController {
    pub fn new(
        user_id: impl Into<UserId>,
        collaborators: Collaborators,
        config: EngineConfig,
    ) -> Result<Self> {
        Self::with_parser(user_id, collaborators, config, QueryParser::new())
    }

    /// Same as `new`, with a parser using custom vocabularies
    pub fn with_parser(
        user_id: impl Into<UserId>,
        collaborators: Collaborators,
        config: EngineConfig,
        parser: QueryParser,
    ) -> Result<Self> {
        config.validate()?;
        let user_id = user_id.into();
        let interactions = InteractionStore::new(
            user_id.clone(),
            collaborators.store.clone(),
            collaborators.tracker.clone(),
        );
        let state = SessionState {
            mode: SessionMode::Browse,
            filters: FilterState::default(),
            pending_query: None,
            effective: EffectiveQuery::default(),
            source: DataSource::DefaultFeed,
            paginator: Paginator::new(config.page_size),
            generation: 0,
            error: None,
            profile_incomplete: false,
        };
        Ok(Self {
            inner: Arc::new(SessionInner {
                user_id,
                recent: Mutex::new(RecentSearches::new(config.recent_capacity)),
                config,
                parser,
                collaborators,
                interactions,
                state: Mutex::new(state),
                debounce: Mutex::new(None),
            }),
        })
    }

    /// Restore saved/dismissed state, then load the first page
    #[instrument(skip(self), fields(user_id = %self.inner.user_id))]
    pub async fn start(&self) {
        if let Err(e) = self.inner.interactions.rehydrate().await {
            warn!("Starting without stored interactions: {}", e);
        }
        self.reload().await;
    }

    /// Record typed query text; the search runs once typing pauses for the
    /// configured debounce. Every call restarts the wait. Until then the text
    /// is only visible through `pending_query`.
    pub fn set_query_text(&self, text: &str) {
        lock(&self.inner.state).pending_query = Some(text.to_string());

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No async runtime, query text kept for the next search");
                self.commit_pending_query();
                return;
            }
        };
        let session = self.clone();
        let delay = self.inner.config.debounce();
        let task = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            session.commit_pending_query();
            session.reload_if_changed().await;
        });
        if let Some(previous) = lock(&self.inner.debounce).replace(task) {
            previous.abort();
        }
    }

    /// Run a search now, skipping the debounce, and remember it
    pub async fn submit_search(&self, text: &str) {
        self.cancel_debounce();
        let filters = {
            let mut state = lock(&self.inner.state);
            let filters = std::mem::take(&mut state.filters);
            state.filters = filters.with_query(text);
            state.filters.clone()
        };
        lock(&self.inner.recent).add(text, &filters);
        self.reload().await;
    }

    /// Replace the facet selections; the current query text is kept
    pub async fn set_filters(&self, filters: FilterState) {
        self.cancel_debounce();
        {
            let mut state = lock(&self.inner.state);
            let text = state.filters.query().to_string();
            state.filters = filters.with_query(text);
        }
        self.reload().await;
    }

    /// Switch between browse and personalized results. Always resets; a
    /// pending debounce is cancelled and its text folded into the reset.
    pub async fn switch_mode(&self, mode: SessionMode) {
        self.cancel_debounce();
        {
            let mut state = lock(&self.inner.state);
            info!("Switching mode {:?} -> {:?}", state.mode, mode);
            state.mode = mode;
        }
        self.reload().await;
    }

    /// Reveal or fetch the next page. Does nothing unless the session is
    /// ready for more.
    #[instrument(skip(self))]
    pub async fn load_more(&self) {
        let (generation, action) = {
            let mut state = lock(&self.inner.state);
            let action = state.paginator.begin_load_more();
            (state.generation, action)
        };

        let cursor = match action {
            None => {
                debug!("Load more ignored, nothing to load");
                return;
            }
            Some(LoadMore::Revealed) => {
                debug!("Revealed more of the held results");
                return;
            }
            Some(LoadMore::Fetch { cursor }) => cursor,
        };

        let session = self.clone();
        let settle = async move {
            let result = session
                .inner
                .collaborators
                .store
                .fetch_feed(Some(&cursor), session.inner.config.page_size)
                .await;
            session.apply_next_page(generation, result);
        };
        if let Err(e) = run_detached(settle).await {
            self.apply_next_page(generation, Err(SourceError::Unavailable(e.to_string())));
        }
    }

    fn apply_next_page(&self, generation: u64, result: std::result::Result<SearchPage, SourceError>) {
        let mut state = lock(&self.inner.state);
        if state.generation != generation {
            debug!("Discarding stale page (generation {} != {})", generation, state.generation);
            return;
        }
        match result {
            Ok(page) => {
                state.paginator.apply_next_page(page);
                info!("Loaded next page, {} listings held", state.paginator.results().len());
            }
            Err(e) => {
                let error = EngineError::LoadMore { message: e.to_string() };
                warn!("{}", error);
                state.paginator.fail_load_more(error.to_string());
            }
        }
    }

    /// Re-run whatever failed last: the first page with the retained query,
    /// or the failed load-more
    pub async fn retry(&self) {
        let (first_page_failed, load_more_failed) = {
            let state = lock(&self.inner.state);
            (
                state.paginator.state() == PageState::Error,
                state.paginator.load_more_error().is_some(),
            )
        };
        if first_page_failed {
            self.reload().await;
        } else if load_more_failed {
            self.load_more().await;
        }
    }

    /// Stop the debounce timer. Text typed so far is committed so the reset
    /// that follows uses it.
    fn cancel_debounce(&self) {
        if let Some(task) = lock(&self.inner.debounce).take() {
            task.abort();
        }
        self.commit_pending_query();
    }

    fn commit_pending_query(&self) {
        let mut state = lock(&self.inner.state);
        if let Some(text) = state.pending_query.take() {
            let filters = std::mem::take(&mut state.filters);
            state.filters = filters.with_query(text);
        }
    }

    /// Debounced path: skip the reset when the text did not change the
    /// effective query of a healthy session. `LoadingFirstPage` counts as
    /// healthy since its fetch settles on its own.
    async fn reload_if_changed(&self) {
        let unchanged = {
            let state = lock(&self.inner.state);
            let effective = merge(&self.inner.parser.parse(state.filters.query()), &state.filters);
            effective == state.effective
                && !matches!(state.paginator.state(), PageState::Idle | PageState::Error)
        };
        if unchanged {
            debug!("Query text did not change the effective query");
            return;
        }
        self.reload().await;
    }

    /// Reset the session and load the first page for the current mode and
    /// filters
    async fn reload(&self) {
        let dispatch = {
            let mut state = lock(&self.inner.state);
            state.generation += 1;
            state.effective = merge(&self.inner.parser.parse(state.filters.query()), &state.filters);
            state.source = DataSource::select(state.mode, &state.effective);
            let strategy = state.source.strategy();
            state.paginator.reset(strategy);
            state.error = None;
            state.profile_incomplete = false;
            info!(
                "Session reset (generation {}, mode {:?}, source {:?})",
                state.generation, state.mode, state.source
            );
            Dispatch {
                generation: state.generation,
                source: state.source,
                query_text: state.filters.query().to_string(),
                effective: state.effective.clone(),
            }
        };

        let generation = dispatch.generation;
        let query_text = dispatch.query_text.clone();
        let session = self.clone();
        let settle = async move {
            let outcome = session.fetch_first_page(&dispatch).await;
            session.apply_first_page(generation, outcome);
        };
        if let Err(e) = run_detached(settle).await {
            let error = EngineError::FirstPage {
                query: query_text,
                message: e.to_string(),
            };
            self.apply_first_page(generation, Err(error));
        }
    }

    fn apply_first_page(&self, generation: u64, outcome: Result<FirstPage>) {
        let mut state = lock(&self.inner.state);
        if state.generation != generation {
            debug!(
                "Discarding stale first page (generation {} != {})",
                generation, state.generation
            );
            return;
        }
        match outcome {
            Ok(FirstPage::Feed(page)) => state.paginator.apply_first_page(page),
            Ok(FirstPage::Batch(listings)) => state.paginator.apply_batch(listings),
            Ok(FirstPage::ProfileIncomplete) => {
                info!("Profile incomplete, no matches to show");
                state.profile_incomplete = true;
                state.paginator.apply_batch(Vec::new());
            }
            Err(e) => {
                warn!("{}", e);
                state.paginator.fail_first_page();
                state.error = Some(e);
                return;
            }
        }
        info!(
            "First page ready: {} visible of {} held",
            state.paginator.visible().len(),
            state.paginator.results().len()
        );
    }

    async fn fetch_first_page(&self, dispatch: &Dispatch) -> Result<FirstPage> {
        let collaborators = &self.inner.collaborators;
        let fail = |e: SourceError| EngineError::first_page(&dispatch.query_text, e);
        match dispatch.source {
            DataSource::DefaultFeed => collaborators
                .store
                .fetch_feed(None, self.inner.config.page_size)
                .await
                .map(FirstPage::Feed)
                .map_err(fail),
            DataSource::Search => {
                let request = SearchRequest::first_page(
                    dispatch.effective.clone(),
                    self.inner.config.window_batch_size,
                );
                collaborators
                    .search
                    .search(&request)
                    .await
                    .map(|page| FirstPage::Batch(page.listings))
                    .map_err(fail)
            }
            DataSource::Matches => match collaborators.matches.get_matches(&self.inner.user_id).await {
                Ok(MatchesOutcome::ProfileIncomplete) => Ok(FirstPage::ProfileIncomplete),
                Ok(MatchesOutcome::Matches(listings)) => narrow_matches(listings, &dispatch.effective)
                    .map(FirstPage::Batch)
                    .map_err(|e| EngineError::FirstPage {
                        query: dispatch.query_text.clone(),
                        message: format!("{:#}", e),
                    }),
                Err(e) => Err(fail(e)),
            },
        }
    }

    pub fn view(&self) -> SessionView {
        let state = lock(&self.inner.state);
        SessionView {
            mode: state.mode,
            source: state.source,
            state: state.paginator.state(),
            listings: self.inner.interactions.visible(state.paginator.visible()),
            total_results: state.paginator.results().len(),
            has_more: state.paginator.has_more(),
            is_loading: state.paginator.is_loading(),
            error: state.error.clone(),
            load_more_error: state.paginator.load_more_error().map(str::to_string),
            profile_incomplete: state.profile_incomplete,
            generation: state.generation,
            filters: state.filters.clone(),
            pending_query: state.pending_query.clone(),
            effective_query: state.effective.clone(),
        }
    }

    pub fn visible_listings(&self) -> Vec<JobListing> {
        let state = lock(&self.inner.state);
        self.inner.interactions.visible(state.paginator.visible())
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.inner.state).paginator.is_loading()
    }

    pub fn has_more(&self) -> bool {
        lock(&self.inner.state).paginator.has_more()
    }

    pub fn mode(&self) -> SessionMode {
        lock(&self.inner.state).mode
    }

    pub fn filters(&self) -> FilterState {
        lock(&self.inner.state).filters.clone()
    }

    /// Typed text the debounce has not picked up yet
    pub fn pending_query(&self) -> Option<String> {
        lock(&self.inner.state).pending_query.clone()
    }

    pub fn effective_query(&self) -> EffectiveQuery {
        lock(&self.inner.state).effective.clone()
    }

    pub fn error(&self) -> Option<EngineError> {
        lock(&self.inner.state).error.clone()
    }

    pub fn profile_incomplete(&self) -> bool {
        lock(&self.inner.state).profile_incomplete
    }

    pub fn interactions(&self) -> &InteractionStore {
        &self.inner.interactions
    }

    pub fn recent_searches(&self) -> Vec<RecentSearchEntry> {
        lock(&self.inner.recent).entries().cloned().collect()
    }

    pub fn remove_recent_search(&self, query: &str) -> bool {
        lock(&self.inner.recent).remove(query)
    }

    pub fn clear_recent_searches(&self) {
        lock(&self.inner.recent).clear();
    }

    /// Snapshot of the recent-search cache, e.g. to persist it
    pub fn export_recent_searches(&self) -> RecentSearches {
        lock(&self.inner.recent).clone()
    }

    /// Replace the recent-search cache with a previously exported one
    pub fn restore_recent_searches(&self, recent: RecentSearches) {
        *lock(&self.inner.recent) = recent;
    }

    /// Type-ahead: recent searches first, then known technologies and
    /// locations
    pub fn suggestions(&self, prefix: &str) -> Vec<String> {
        let vocabulary = self.inner.parser.vocabulary();
        lock(&self.inner.recent).suggestions(prefix, vocabulary, SUGGESTION_LIMIT)
    }
}

/// Keep only the matches that satisfy the active filters
fn narrow_matches(listings: Vec<JobListing>, effective: &EffectiveQuery) -> anyhow::Result<Vec<JobListing>> {
    if effective.is_unfiltered() {
        return Ok(listings);
    }
    let total = listings.len();
    let narrowed = FilterPipeline::standard(unix_now())
        .apply(listings, effective)
        .context("Failed to narrow matches")?;
    debug!("Narrowed {} matches to {}", total, narrowed.len());
    Ok(narrowed)
}
