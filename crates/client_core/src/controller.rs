//! Gallery state controller.
//!
//! The controller is owned by a single UI context. Loads run on spawned tokio
//! tasks, but their results come back through a completion channel and are
//! only applied when the owner calls [`GalleryController::next_completion`] or
//! [`GalleryController::poll_completions`], so every mutation of the list
//! happens on the owning context.

use std::sync::Arc;

use shared::{
    domain::{CapturedItem, ItemId, SortOrder},
    error::{ErrorKind, GalleryError},
    timestamp::compare_capture_times,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::{pager::DetailPager, service::GalleryService};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryEvent {
    ItemsReplaced {
        generation: u64,
        count: usize,
    },
    LoadFailed {
        generation: u64,
        kind: ErrorKind,
        message: String,
    },
    Sorted {
        order: SortOrder,
    },
    Reordered {
        from: usize,
        to: usize,
    },
}

#[derive(Debug)]
pub struct LoadCompletion {
    pub generation: u64,
    pub user_id: String,
    pub result: Result<Vec<CapturedItem>, GalleryError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Replaced { generation: u64, count: usize },
    Failed { generation: u64, error: GalleryError },
    Stale { generation: u64, latest: u64 },
}

impl LoadOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Replaced { generation, .. }
            | Self::Failed { generation, .. }
            | Self::Stale { generation, .. } => *generation,
        }
    }
}

pub struct GalleryController {
    service: Arc<dyn GalleryService>,
    items: Vec<CapturedItem>,
    sort_order: SortOrder,
    latest_generation: u64,
    pending_loads: usize,
    dragged: Option<ItemId>,
    completions_tx: mpsc::UnboundedSender<LoadCompletion>,
    completions_rx: mpsc::UnboundedReceiver<LoadCompletion>,
    events: broadcast::Sender<GalleryEvent>,
}

impl GalleryController {
    pub fn new(service: Arc<dyn GalleryService>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            service,
            items: Vec::new(),
            sort_order: SortOrder::default(),
            latest_generation: 0,
            pending_loads: 0,
            dragged: None,
            completions_tx,
            completions_rx,
            events,
        }
    }

    pub fn items(&self) -> &[CapturedItem] {
        &self.items
    }

    pub fn item(&self, id: &ItemId) -> Option<&CapturedItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest_generation
    }

    pub fn pending_loads(&self) -> usize {
        self.pending_loads
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GalleryEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the current list for the paged detail view.
    pub fn detail_pager(&self) -> DetailPager {
        DetailPager::new(self.items.clone())
    }

    /// Issues a fetch for `user_id` on a background task and returns its
    /// generation. Must be called from within a tokio runtime.
    pub fn load(&mut self, user_id: &str) -> Result<u64, GalleryError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(GalleryError::InvalidUserId);
        }

        self.latest_generation += 1;
        self.pending_loads += 1;
        let generation = self.latest_generation;
        info!(generation, user_id, "issuing gallery load");

        let service = Arc::clone(&self.service);
        let completions_tx = self.completions_tx.clone();
        let user_id = user_id.to_string();
        tokio::spawn(async move {
            let fetch_user_id = user_id.clone();
            let fetch = tokio::spawn(async move {
                service
                    .fetch_user_images(&fetch_user_id)
                    .await
                    .map(CapturedItem::from_records)
            });
            // A fetch that dies still has to report, or its generation never settles.
            let result = match fetch.await {
                Ok(result) => result,
                Err(err) => Err(GalleryError::Transport(format!("load task failed: {err}"))),
            };
            let _ = completions_tx.send(LoadCompletion {
                generation,
                user_id,
                result,
            });
        });

        Ok(generation)
    }

    /// Waits for the next load completion and applies it. Returns `None` when
    /// no load is outstanding.
    pub async fn next_completion(&mut self) -> Option<LoadOutcome> {
        if self.pending_loads == 0 {
            return None;
        }
        let completion = self.completions_rx.recv().await?;
        self.pending_loads = self.pending_loads.saturating_sub(1);
        Some(self.apply_completion(completion))
    }

    /// Applies every completion that is already available without waiting.
    pub fn poll_completions(&mut self) -> Vec<LoadOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.pending_loads = self.pending_loads.saturating_sub(1);
            outcomes.push(self.apply_completion(completion));
        }
        outcomes
    }

    /// Issues a load and waits for its own completion. Completions of older
    /// loads that arrive first are applied (and discarded as stale) on the way.
    pub async fn load_now(&mut self, user_id: &str) -> Result<LoadOutcome, GalleryError> {
        let generation = self.load(user_id)?;
        while let Some(outcome) = self.next_completion().await {
            if outcome.generation() == generation {
                return Ok(outcome);
            }
        }
        Err(GalleryError::Transport(format!(
            "load {generation} ended without reporting a result"
        )))
    }

    pub fn apply_completion(&mut self, completion: LoadCompletion) -> LoadOutcome {
        let LoadCompletion {
            generation,
            user_id,
            result,
        } = completion;

        if generation != self.latest_generation {
            debug!(
                generation,
                latest = self.latest_generation,
                %user_id,
                "discarding stale gallery response"
            );
            return LoadOutcome::Stale {
                generation,
                latest: self.latest_generation,
            };
        }

        match result {
            Ok(items) => {
                let count = items.len();
                self.items = items;
                info!(generation, %user_id, count, "gallery list replaced");
                let _ = self
                    .events
                    .send(GalleryEvent::ItemsReplaced { generation, count });
                LoadOutcome::Replaced { generation, count }
            }
            Err(error) => {
                warn!(
                    generation,
                    %user_id,
                    kind = ?error.kind(),
                    %error,
                    "gallery load failed; keeping current list"
                );
                let _ = self.events.send(GalleryEvent::LoadFailed {
                    generation,
                    kind: error.kind(),
                    message: error.to_string(),
                });
                LoadOutcome::Failed { generation, error }
            }
        }
    }

    /// Records the selected order and re-sorts the list with it.
    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
        self.sort(order);
    }

    pub fn sort(&mut self, order: SortOrder) {
        sort_items(&mut self.items, order);
        debug!(order = %order, count = self.items.len(), "gallery sorted");
        let _ = self.events.send(GalleryEvent::Sorted { order });
    }

    pub fn reorder(&mut self, moved: &CapturedItem, target: &CapturedItem) -> bool {
        self.reorder_by_id(&moved.id, &target.id)
    }

    /// Moves `moved` into the position currently held by `target`.
    ///
    /// Returns false and leaves the list untouched when either item is absent
    /// or both refer to the same item.
    pub fn reorder_by_id(&mut self, moved: &ItemId, target: &ItemId) -> bool {
        let (Some(from), Some(to)) = (self.position_of(moved), self.position_of(target)) else {
            debug!(%moved, %target, "reorder skipped: item not in list");
            return false;
        };
        if from == to {
            return false;
        }

        let item = self.items.remove(from);
        self.items.insert(to, item);
        let _ = self.events.send(GalleryEvent::Reordered { from, to });
        true
    }

    pub fn begin_drag(&mut self, id: &ItemId) {
        self.dragged = Some(id.clone());
    }

    pub fn cancel_drag(&mut self) {
        self.dragged = None;
    }

    pub fn dragged(&self) -> Option<&ItemId> {
        self.dragged.as_ref()
    }

    /// Drops the dragged item onto `target`. The drag ends only when the
    /// drop actually moved something.
    pub fn drop_on(&mut self, target: &ItemId) -> bool {
        let Some(dragged) = self.dragged.clone() else {
            debug!(%target, "drop ignored: nothing is being dragged");
            return false;
        };
        if !self.reorder_by_id(&dragged, target) {
            return false;
        }
        self.dragged = None;
        true
    }

    fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }
}

pub fn sort_items(items: &mut Vec<CapturedItem>, order: SortOrder) {
    let mut keyed: Vec<_> = items
        .drain(..)
        .map(|item| (item.captured_at(), item))
        .collect();
    keyed.sort_by(|(a_time, a), (b_time, b)| {
        compare_capture_times(a_time.as_ref(), b_time.as_ref(), order).then_with(|| match order {
            SortOrder::TimeAscending => a.id.cmp(&b.id),
            SortOrder::TimeDescending => b.id.cmp(&a.id),
        })
    });
    items.extend(keyed.into_iter().map(|(_, item)| item));
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
