//! Public mural list: filters, page cursor and the fetched page.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use metrics::counter;
use murales_api_types::{Mural, PaginationMeta};
use tracing::{debug, warn};

use crate::application::debounce::Debouncer;
use crate::application::pagination::PageNavigation;
use crate::application::repos::MuralsRepo;
use crate::domain::filters::{FilterKey, MuralFilters, MuralQuery};
use crate::util::lock::lock_state;

pub const LOAD_ERROR: &str = "Failed to load murals";

/// Everything a list display needs, copied out of the controller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MuralsState {
    pub murals: Vec<Mural>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub pagination: PaginationMeta,
    pub filters: MuralFilters,
}

impl MuralsState {
    pub fn navigation(&self) -> PageNavigation {
        PageNavigation::new(self.pagination.page, self.pagination.total_pages)
    }
}

/// What happened to a fetch once its response arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Failed,
    /// A newer request was issued meanwhile; this response was dropped.
    Superseded,
}

/// Owner of the public list state.
///
/// Every mutation goes through the methods below and refetches. Requests are
/// numbered; only the response to the most recently issued request is
/// applied, so the list always reflects the latest requested filters even
/// when responses arrive out of order.
pub struct MuralsController {
    repo: Arc<dyn MuralsRepo>,
    state: Mutex<MuralsState>,
    issued: AtomicU64,
}

impl MuralsController {
    pub fn new(repo: Arc<dyn MuralsRepo>) -> Self {
        Self {
            repo,
            state: Mutex::new(MuralsState::default()),
            issued: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MuralsState {
        lock_state(&self.state, "murals").clone()
    }

    /// Update one filter, go back to the first page and refetch.
    pub async fn set_filter(&self, key: FilterKey, value: impl Into<String>) -> FetchOutcome {
        {
            let mut state = lock_state(&self.state, "murals");
            state.filters.set(key, value);
            state.pagination.page = 1;
        }
        self.fetch_murals().await
    }

    pub async fn clear_filters(&self) -> FetchOutcome {
        {
            let mut state = lock_state(&self.state, "murals");
            state.filters.clear();
            state.pagination.page = 1;
        }
        self.fetch_murals().await
    }

    /// Replace every filter and the page in one step, as when opening a
    /// shared link, then fetch once.
    pub async fn restore(&self, filters: &MuralFilters, page: u32) -> FetchOutcome {
        {
            let mut state = lock_state(&self.state, "murals");
            state.filters.clear();
            for key in FilterKey::ALL {
                state.filters.set(key, filters.get(key));
            }
            if !state.filters.municipality_applicable() {
                state.filters.municipality.clear();
            }
            state.pagination.page = page.max(1);
        }
        self.fetch_murals().await
    }

    /// Move to page `page`. Values below 1 are clamped to 1; pages past the
    /// last known page are forwarded and left to the backend to answer.
    pub async fn set_page(&self, page: u32) -> FetchOutcome {
        {
            let mut state = lock_state(&self.state, "murals");
            state.pagination.page = page.max(1);
        }
        self.fetch_murals().await
    }

    pub async fn fetch_murals(&self) -> FetchOutcome {
        let (seq, query) = {
            let mut state = lock_state(&self.state, "murals");
            state.is_loading = true;
            state.error = None;
            let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            (
                seq,
                MuralQuery::new(state.pagination.page, state.filters.clone()),
            )
        };

        let result = self.repo.list_murals(&query).await;

        let mut state = lock_state(&self.state, "murals");
        if seq != self.issued.load(Ordering::SeqCst) {
            counter!("murales_list_fetch_total", "outcome" => "superseded").increment(1);
            debug!(
                target = "murales::application::murals",
                seq,
                page = query.page,
                "Dropping superseded list response"
            );
            return FetchOutcome::Superseded;
        }

        state.is_loading = false;
        match result {
            Ok(page) => {
                counter!("murales_list_fetch_total", "outcome" => "ok").increment(1);
                state.murals = page.data;
                state.pagination = page.meta;
                FetchOutcome::Applied
            }
            Err(err) => {
                counter!("murales_list_fetch_total", "outcome" => "error").increment(1);
                warn!(
                    target = "murales::application::murals",
                    error = %err,
                    page = query.page,
                    "Failed to fetch murals"
                );
                state.error = Some(LOAD_ERROR.to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// Debouncer committing free-text name input to the `name` filter.
    ///
    /// Settled text equal to the current filter is ignored, so a clear or
    /// restore in between makes the same text count as new again.
    pub fn name_debouncer(self: &Arc<Self>, delay: Duration) -> Debouncer {
        let controller = Arc::clone(self);
        Debouncer::spawn(delay, move |name| {
            let controller = Arc::clone(&controller);
            async move {
                let unchanged = lock_state(&controller.state, "murals").filters.name == name;
                if !unchanged {
                    controller.set_filter(FilterKey::Name, name).await;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use murales_api_types::{CreateMuralResponse, ListResponse, NewMural};
    use time::macros::datetime;
    use tokio::sync::{Mutex as AsyncMutex, oneshot};

    use super::*;
    use crate::application::repos::RepoError;

    fn mural(id: &str) -> Mural {
        Mural {
            id: id.to_string(),
            name: format!("Mural {id}"),
            image_url: format!("https://res.cloudinary.com/x/image/upload/{id}.jpg"),
            latitude: -34.6,
            longitude: -58.4,
            province: "Ciudad Autónoma de Buenos Aires".into(),
            municipality: None,
            neighborhood: Some("Palermo".into()),
            formatted_address: None,
            created_at: datetime!(2024-05-01 10:00 UTC),
        }
    }

    fn page_of(ids: &[&str], page: u32, total_pages: u32) -> ListResponse<Mural> {
        ListResponse {
            data: ids.iter().map(|id| mural(id)).collect(),
            meta: PaginationMeta {
                page,
                per_page: 10,
                total_pages,
                total_count: u64::from(total_pages) * 10,
            },
        }
    }

    /// Records queries and answers from a script of canned results.
    #[derive(Default)]
    struct ScriptedRepo {
        queries: AsyncMutex<Vec<MuralQuery>>,
        answers: AsyncMutex<VecDeque<Result<ListResponse<Mural>, RepoError>>>,
    }

    impl ScriptedRepo {
        fn with(answers: Vec<Result<ListResponse<Mural>, RepoError>>) -> Arc<Self> {
            Arc::new(Self {
                queries: AsyncMutex::default(),
                answers: AsyncMutex::new(answers.into()),
            })
        }

        async fn queries(&self) -> Vec<MuralQuery> {
            self.queries.lock().await.clone()
        }
    }

    #[async_trait]
    impl MuralsRepo for ScriptedRepo {
        async fn list_murals(&self, query: &MuralQuery) -> Result<ListResponse<Mural>, RepoError> {
            self.queries.lock().await.push(query.clone());
            self.answers
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Ok(page_of(&[], query.page, 1)))
        }

        async fn map_murals(&self) -> Result<Vec<Mural>, RepoError> {
            Ok(Vec::new())
        }

        async fn get_mural(&self, _id: &str) -> Result<Mural, RepoError> {
            Err(RepoError::NotFound)
        }

        async fn create_mural(&self, _mural: NewMural) -> Result<CreateMuralResponse, RepoError> {
            Err(RepoError::Transport("unused".into()))
        }
    }

    #[tokio::test]
    async fn fetch_replaces_list_and_meta() {
        let repo = ScriptedRepo::with(vec![Ok(page_of(&["a", "b"], 1, 3))]);
        let controller = MuralsController::new(repo.clone());

        assert_eq!(controller.fetch_murals().await, FetchOutcome::Applied);

        let state = controller.snapshot();
        assert_eq!(state.murals.len(), 2);
        assert_eq!(state.pagination.total_pages, 3);
        assert!(!state.is_loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn failure_keeps_previous_list() {
        let repo = ScriptedRepo::with(vec![
            Ok(page_of(&["a"], 1, 2)),
            Err(RepoError::Transport("connection reset".into())),
        ]);
        let controller = MuralsController::new(repo.clone());
        controller.fetch_murals().await;

        assert_eq!(controller.set_page(2).await, FetchOutcome::Failed);

        let state = controller.snapshot();
        assert_eq!(state.murals, vec![mural("a")]);
        assert_eq!(state.error.as_deref(), Some(LOAD_ERROR));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn setting_a_filter_resets_page() {
        let repo = ScriptedRepo::with(vec![Ok(page_of(&["a"], 4, 9))]);
        let controller = MuralsController::new(repo.clone());
        controller.set_page(4).await;

        controller.set_filter(FilterKey::Neighborhood, "Palermo").await;

        let queries = repo.queries().await;
        assert_eq!(queries[0].page, 4);
        assert_eq!(queries[1].page, 1);
        assert_eq!(queries[1].filters.neighborhood, "Palermo");
    }

    #[tokio::test]
    async fn capital_province_clears_municipality_filter() {
        let repo = ScriptedRepo::with(Vec::new());
        let controller = MuralsController::new(repo.clone());
        controller.set_filter(FilterKey::Municipality, "Quilmes").await;

        controller
            .set_filter(FilterKey::Province, "Ciudad Autónoma de Buenos Aires")
            .await;

        let state = controller.snapshot();
        assert!(state.filters.municipality.is_empty());
        let last = repo.queries().await.pop().expect("query issued");
        assert!(
            last.to_query_pairs()
                .iter()
                .all(|(key, _)| *key != "municipality")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn typed_name_commits_once_on_first_page() {
        let repo = ScriptedRepo::with(Vec::new());
        let controller = Arc::new(MuralsController::new(repo.clone()));
        controller.set_page(3).await;
        let typing = controller.name_debouncer(Duration::from_millis(300));

        for text in ["p", "pu", "puer", "puerta"] {
            typing.push(text);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(300)).await;
        typing.shutdown().await;

        let queries = repo.queries().await;
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].page, 1);
        assert_eq!(queries[1].filters.name, "puerta");
        assert_eq!(controller.snapshot().filters.name, "puerta");
    }

    #[tokio::test(start_paused = true)]
    async fn retyped_name_after_clear_is_searched_again() {
        let repo = ScriptedRepo::with(Vec::new());
        let controller = Arc::new(MuralsController::new(repo.clone()));
        let typing = controller.name_debouncer(Duration::from_millis(300));

        typing.push("puerta");
        tokio::time::sleep(Duration::from_millis(400)).await;
        controller.clear_filters().await;
        assert_eq!(controller.snapshot().filters.name, "");

        typing.push("puerta");
        tokio::time::sleep(Duration::from_millis(400)).await;
        typing.shutdown().await;

        assert_eq!(controller.snapshot().filters.name, "puerta");
        assert_eq!(repo.queries().await.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn settled_name_equal_to_filter_skips_fetch() {
        let repo = ScriptedRepo::with(Vec::new());
        let controller = Arc::new(MuralsController::new(repo.clone()));
        controller.set_filter(FilterKey::Name, "arte").await;
        let typing = controller.name_debouncer(Duration::from_millis(300));

        typing.push("art");
        typing.push("arte");
        typing.finish().await;

        assert_eq!(repo.queries().await.len(), 1);
    }

    #[tokio::test]
    async fn clear_filters_resets_everything() {
        let repo = ScriptedRepo::with(Vec::new());
        let controller = MuralsController::new(repo.clone());
        controller.set_filter(FilterKey::Name, "puerta").await;
        controller.set_page(3).await;

        controller.clear_filters().await;

        let last = repo.queries().await.pop().expect("query issued");
        assert_eq!(last, MuralQuery::new(1, MuralFilters::default()));
    }

    #[tokio::test]
    async fn page_zero_is_clamped() {
        let repo = ScriptedRepo::with(Vec::new());
        let controller = MuralsController::new(repo.clone());

        controller.set_page(0).await;

        assert_eq!(repo.queries().await[0].page, 1);
    }

    #[tokio::test]
    async fn page_two_with_name_builds_expected_query() {
        let repo = ScriptedRepo::with(Vec::new());
        let controller = MuralsController::new(repo.clone());
        controller.set_filter(FilterKey::Province, "").await;
        controller.set_filter(FilterKey::Name, "puerta").await;

        controller.set_page(2).await;

        let last = repo.queries().await.pop().expect("query issued");
        assert_eq!(
            last.to_query_pairs(),
            vec![("page", "2".to_string()), ("name", "puerta".to_string())]
        );
    }

    #[tokio::test]
    async fn restore_issues_a_single_query() {
        let repo = ScriptedRepo::with(Vec::new());
        let controller = MuralsController::new(repo.clone());
        let link = MuralFilters {
            province: "CABA".into(),
            municipality: "Lanús".into(),
            neighborhood: "Boedo".into(),
            ..MuralFilters::default()
        };

        controller.restore(&link, 3).await;

        let queries = repo.queries().await;
        assert_eq!(queries.len(), 1);
        assert_eq!(
            queries[0].to_query_pairs(),
            vec![
                ("page", "3".to_string()),
                ("province", "CABA".to_string()),
                ("neighborhood", "Boedo".to_string()),
            ]
        );
    }

    /// Holds the first request until released, answering later ones at once.
    struct GatedRepo {
        gate: AsyncMutex<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait]
    impl MuralsRepo for GatedRepo {
        async fn list_murals(&self, query: &MuralQuery) -> Result<ListResponse<Mural>, RepoError> {
            let gate = self.gate.lock().await.take();
            if let Some(gate) = gate {
                let _ = gate.await;
                return Ok(page_of(&["stale"], query.page, 1));
            }
            Ok(page_of(&["fresh"], query.page, 1))
        }

        async fn map_murals(&self) -> Result<Vec<Mural>, RepoError> {
            Ok(Vec::new())
        }

        async fn get_mural(&self, _id: &str) -> Result<Mural, RepoError> {
            Err(RepoError::NotFound)
        }

        async fn create_mural(&self, _mural: NewMural) -> Result<CreateMuralResponse, RepoError> {
            Err(RepoError::Transport("unused".into()))
        }
    }

    #[tokio::test]
    async fn late_response_to_older_request_is_dropped() {
        let (release, gate) = oneshot::channel();
        let repo = Arc::new(GatedRepo {
            gate: AsyncMutex::new(Some(gate)),
        });
        let controller = Arc::new(MuralsController::new(repo));

        let slow = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.set_filter(FilterKey::Name, "pu").await }
        });
        tokio::task::yield_now().await;
        while controller.issued.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let fast = controller.set_filter(FilterKey::Name, "puerta").await;
        release.send(()).expect("slow request still waiting");
        let slow = slow.await.expect("task");

        assert_eq!(fast, FetchOutcome::Applied);
        assert_eq!(slow, FetchOutcome::Superseded);
        let state = controller.snapshot();
        assert_eq!(state.murals, vec![mural("fresh")]);
        assert_eq!(state.filters.name, "puerta");
    }
}
