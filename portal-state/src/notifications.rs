use payloads::{Notification, NotificationId};
use std::cell::RefCell;
use std::collections::HashMap;

/// Store revision taken when a fetch was issued. Every ticket is unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// The notifications currently known to the UI.
///
/// Every write replaces the whole list. Read marks made locally are
/// remembered with the revision they landed at, so that a fetch issued
/// before the mark cannot flip an entry back to unread when it resolves.
///
/// The revision only ever grows, across [`clear`](Self::clear) too. A fetch
/// result is dropped when a newer fetch was already applied or the store
/// was cleared after it was issued.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationStore {
    items: Vec<Notification>,
    revision: u64,
    local_reads: HashMap<NotificationId, u64>,
    /// Fetches issued at or before this revision are stale.
    stale_before: u64,
}

impl NotificationStore {
    pub fn new(items: Vec<Notification>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.items
    }

    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.items.iter().find(|n| &n.id == id)
    }

    pub fn unread(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(|n| !n.read)
    }

    pub fn unread_count(&self) -> usize {
        self.unread().count()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Blind replacement: whatever is written last wins.
    pub fn set_notifications(&mut self, items: Vec<Notification>) {
        self.items = items;
        self.revision += 1;
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.revision += 1;
        FetchTicket(self.revision)
    }

    /// Replace the list with a fetch result, keeping read marks that landed
    /// after the fetch was issued. Returns false, leaving the store alone,
    /// if the result is stale.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        mut items: Vec<Notification>,
    ) -> bool {
        if ticket.0 <= self.stale_before {
            tracing::debug!(
                ticket = ticket.0,
                stale_before = self.stale_before,
                "Dropping superseded notification fetch"
            );
            return false;
        }
        let mut kept = 0;
        for item in items.iter_mut() {
            if let Some(&marked_at) = self.local_reads.get(&item.id) {
                if marked_at > ticket.0 && !item.read {
                    item.read = true;
                    kept += 1;
                }
            }
        }
        if kept > 0 {
            tracing::debug!(
                kept,
                "Fetch result predates local read marks, keeping them"
            );
        }
        self.local_reads.retain(|_, marked_at| *marked_at > ticket.0);
        self.items = items;
        self.revision += 1;
        self.stale_before = ticket.0;
        true
    }

    /// Mark one entry read. Returns false if the id is not in the list.
    pub fn mark_read(&mut self, id: &NotificationId) -> bool {
        self.mark_many_read(std::slice::from_ref(id)) == 1
    }

    /// Mark every listed entry read in one pass, returning how many entries
    /// were in the list.
    pub fn mark_many_read(&mut self, ids: &[NotificationId]) -> usize {
        if ids.is_empty() {
            return 0;
        }
        self.revision += 1;
        let mut found = 0;
        for item in self.items.iter_mut() {
            if ids.contains(&item.id) {
                item.read = true;
                found += 1;
            }
        }
        for id in ids {
            self.local_reads.insert(id.clone(), self.revision);
        }
        found
    }

    /// Empty the store, e.g. on logout. Fetches still in flight are
    /// dropped when they resolve.
    pub fn clear(&mut self) {
        self.items.clear();
        self.local_reads.clear();
        self.revision += 1;
        self.stale_before = self.revision;
    }
}

/// Somewhere async code can take a fetch ticket from and write results to,
/// without owning the store.
pub trait NotificationSink {
    fn ticket(&self) -> FetchTicket;
    fn update(&self, f: impl FnOnce(&mut NotificationStore));
}

impl NotificationSink for RefCell<NotificationStore> {
    fn ticket(&self) -> FetchTicket {
        self.borrow_mut().begin_fetch()
    }

    fn update(&self, f: impl FnOnce(&mut NotificationStore)) {
        f(&mut self.borrow_mut());
    }
}
