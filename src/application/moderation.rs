//! Administrative review of submissions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use metrics::counter;
use murales_api_types::{MuralStatus, MuralSummary, MuralWithDetails, PaginationMeta};
use tracing::{debug, info, warn};

use crate::application::murals::FetchOutcome;
use crate::application::repos::ModerationRepo;
use crate::domain::moderation::{ApproveOptions, RejectOptions};
use crate::util::lock::lock_state;

const LOAD_ERROR: &str = "Failed to load murals";
const APPROVED: &str = "Mural approved successfully";
const APPROVE_FAILED: &str = "Failed to approve mural";
const REJECTED: &str = "Mural rejected successfully";
const REJECT_FAILED: &str = "Failed to reject mural";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModerationState {
    pub murals: Vec<MuralWithDetails>,
    pub current_status: MuralStatus,
    pub is_loading: bool,
    pub error: Option<String>,
    pub pagination: PaginationMeta,
    pub summary: MuralSummary,
}

/// Result of an approve/reject request, phrased for the reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

pub struct ModerationController {
    repo: Arc<dyn ModerationRepo>,
    state: Mutex<ModerationState>,
    issued: AtomicU64,
}

impl ModerationController {
    pub fn new(repo: Arc<dyn ModerationRepo>) -> Self {
        Self {
            repo,
            state: Mutex::new(ModerationState::default()),
            issued: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> ModerationState {
        lock_state(&self.state, "moderation").clone()
    }

    /// Load the current page of submissions in `status`. Switching status
    /// keeps the page number, as the review tabs do.
    pub async fn fetch_murals(&self, status: MuralStatus) -> FetchOutcome {
        let (seq, page) = {
            let mut state = lock_state(&self.state, "moderation");
            state.is_loading = true;
            state.error = None;
            state.current_status = status;
            let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            (seq, state.pagination.page)
        };

        let result = self.repo.list_submissions(status, page).await;

        let mut state = lock_state(&self.state, "moderation");
        if seq != self.issued.load(Ordering::SeqCst) {
            debug!(
                target = "murales::application::moderation",
                seq,
                %status,
                "Dropping superseded submissions response"
            );
            return FetchOutcome::Superseded;
        }

        state.is_loading = false;
        match result {
            Ok(list) => {
                state.murals = list.data;
                state.pagination = list.meta;
                FetchOutcome::Applied
            }
            Err(err) => {
                warn!(
                    target = "murales::application::moderation",
                    %status,
                    page,
                    error = %err,
                    "Failed to fetch submissions"
                );
                state.error = Some(LOAD_ERROR.to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// Refresh the per-status counters. Failures keep the old counters.
    pub async fn fetch_summary(&self) {
        match self.repo.summary().await {
            Ok(summary) => lock_state(&self.state, "moderation").summary = summary,
            Err(err) => warn!(
                target = "murales::application::moderation",
                error = %err,
                "Failed to fetch moderation summary"
            ),
        }
    }

    /// Same clamping as the public list: at least 1, no upper bound.
    pub async fn set_page(&self, page: u32) -> FetchOutcome {
        let status = {
            let mut state = lock_state(&self.state, "moderation");
            state.pagination.page = page.max(1);
            state.current_status
        };
        self.fetch_murals(status).await
    }

    /// Jump straight to `page` of `status`.
    pub async fn open(&self, status: MuralStatus, page: u32) -> FetchOutcome {
        lock_state(&self.state, "moderation").pagination.page = page.max(1);
        self.fetch_murals(status).await
    }

    pub async fn approve(&self, id: &str, options: &ApproveOptions) -> ActionOutcome {
        match self.repo.approve(id, options.to_request()).await {
            Ok(()) => {
                counter!("murales_moderation_total", "action" => "approve").increment(1);
                info!(
                    target = "murales::application::moderation",
                    id,
                    send_email = options.send_email,
                    "Mural approved"
                );
                self.refresh_after_review().await;
                ActionOutcome::ok(APPROVED)
            }
            Err(err) => {
                warn!(
                    target = "murales::application::moderation",
                    id,
                    error = %err,
                    "Approve request failed"
                );
                ActionOutcome::failed(err.user_message().unwrap_or(APPROVE_FAILED))
            }
        }
    }

    /// Reject a submission. An inadequate reason is reported without
    /// contacting the backend.
    pub async fn reject(&self, id: &str, options: &RejectOptions) -> ActionOutcome {
        let request = match options.to_request() {
            Ok(request) => request,
            Err(invalid) => return ActionOutcome::failed(invalid.to_string()),
        };

        match self.repo.reject(id, request).await {
            Ok(()) => {
                counter!("murales_moderation_total", "action" => "reject").increment(1);
                info!(
                    target = "murales::application::moderation",
                    id,
                    send_email = options.send_email,
                    "Mural rejected"
                );
                self.refresh_after_review().await;
                ActionOutcome::ok(REJECTED)
            }
            Err(err) => {
                warn!(
                    target = "murales::application::moderation",
                    id,
                    error = %err,
                    "Reject request failed"
                );
                ActionOutcome::failed(err.user_message().unwrap_or(REJECT_FAILED))
            }
        }
    }

    async fn refresh_after_review(&self) {
        let status = lock_state(&self.state, "moderation").current_status;
        futures::join!(self.fetch_murals(status), self.fetch_summary());
    }
}
