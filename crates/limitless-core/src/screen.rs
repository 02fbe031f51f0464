//! Management screen state: list, create, update and delete one entity kind
//!
//! [`ScreenState`] is a synchronous state machine. Every asynchronous operation is
//! split into a `begin_*` call, which applies the optimistic change and hands out a
//! [`Ticket`], and a `finish_*` call, which reconciles the backing store's response.
//! Responses may arrive in any order; each carries its ticket, so stale or
//! superseded responses are recognised and discarded. Unmounting bumps the
//! generation, which invalidates every outstanding ticket.
//!
//! [`ManagementScreen`] drives the state machine against an [`EntityStore`].

use async_trait::async_trait;
use chrono::Utc;
use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};
use uuid::Uuid;

use crate::entity::{EntityKind, Fields, ManagedEntity, ValidationMode};
use crate::{Error, Result};

/// Backing-store operations a management screen needs
#[async_trait(?Send)]
pub trait EntityStore {
    /// Fetch every record of `kind`
    async fn list(&self, kind: EntityKind) -> Result<Vec<ManagedEntity>>;

    /// Insert a record; the store assigns the id
    async fn create(&self, kind: EntityKind, fields: &Fields) -> Result<ManagedEntity>;

    /// Apply a partial field mapping to a record
    async fn update(&self, kind: EntityKind, id: Uuid, fields: &Fields)
    -> Result<ManagedEntity>;

    /// Remove a record
    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<()>;
}

#[async_trait(?Send)]
impl<T: EntityStore + ?Sized> EntityStore for Rc<T> {
    async fn list(&self, kind: EntityKind) -> Result<Vec<ManagedEntity>> {
        (**self).list(kind).await
    }

    async fn create(&self, kind: EntityKind, fields: &Fields) -> Result<ManagedEntity> {
        (**self).create(kind, fields).await
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: Uuid,
        fields: &Fields,
    ) -> Result<ManagedEntity> {
        (**self).update(kind, id, fields).await
    }

    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<()> {
        (**self).delete(kind, id).await
    }
}

/// Load state of the collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A list request is in flight
    Loading,
    /// The last list request succeeded
    Ready,
    /// The last list request failed; the message is shown with a retry control
    Failed(String),
}

/// Mutation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Insert
    Create,
    /// Partial update
    Update,
    /// Removal
    Delete,
}

/// Reconciliation state of one cached record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityState {
    /// Mirrors the backing store
    Confirmed,
    /// A mutation is in flight; `original` is restored if it fails
    Pending {
        /// The in-flight mutation
        action: Action,
        /// Last confirmed value, absent for creates
        original: Option<ManagedEntity>,
    },
    /// The last mutation failed and was reverted
    Failed(String),
}

/// Result of reconciling one response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The response was applied and the change is confirmed
    Applied,
    /// The response was an error; the optimistic change was reverted
    Failed,
    /// The response was stale or superseded and changed nothing visible
    Discarded,
}

/// Proof of an in-flight request, returned by `begin_*` and consumed by `finish_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    seq: u64,
    target: Option<Uuid>,
}

impl Ticket {
    /// Record the request affects, if any
    #[must_use]
    pub const fn target(&self) -> Option<Uuid> {
        self.target
    }
}

#[derive(Debug, Clone)]
struct Row {
    entity: ManagedEntity,
    state: EntityState,
    // Sequence number of the last local change
    revision: u64,
    // Sequence number of the in-flight mutation whose response is authoritative
    op: Option<u64>,
}

impl Row {
    const fn confirmed(entity: ManagedEntity, revision: u64) -> Self {
        Self {
            entity,
            state: EntityState::Confirmed,
            revision,
            op: None,
        }
    }

    const fn is_pending(&self) -> bool {
        matches!(self.state, EntityState::Pending { .. })
    }

    const fn is_hidden(&self) -> bool {
        matches!(
            self.state,
            EntityState::Pending {
                action: Action::Delete,
                ..
            }
        )
    }

    // Whether local knowledge is fresher than a list issued at `seq`
    const fn is_newer_than(&self, seq: u64) -> bool {
        self.is_pending() || self.revision > seq
    }

    fn view(&self) -> RowView {
        let (pending, error) = match &self.state {
            EntityState::Confirmed => (None, None),
            EntityState::Pending { action, .. } => (Some(*action), None),
            EntityState::Failed(message) => (None, Some(message.clone())),
        };
        RowView {
            entity: self.entity.clone(),
            pending,
            error,
        }
    }
}

/// Render-ready copy of one visible row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    /// Current (possibly optimistic) value
    pub entity: ManagedEntity,
    /// In-flight mutation, if any
    pub pending: Option<Action>,
    /// Inline error from the last failed mutation
    pub error: Option<String>,
}

impl RowView {
    /// Controls for this row should be disabled
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.pending.is_some()
    }
}

/// Render-ready copy of the whole screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenView {
    /// Collection load state
    pub status: ListStatus,
    /// Visible rows, newest local additions first
    pub rows: Vec<RowView>,
    /// Error from the last failed create, shown next to the create form
    pub create_error: Option<String>,
    /// A create is in flight
    pub creating: bool,
}

/// Cached collection and per-record reconciliation state for one screen
#[derive(Debug, Clone)]
pub struct ScreenState {
    kind: EntityKind,
    generation: u64,
    seq: u64,
    mounted: bool,
    status: ListStatus,
    rows: Vec<Row>,
    tombstones: HashSet<Uuid>,
    latest_list: Option<u64>,
    create_error: Option<String>,
}

impl ScreenState {
    /// Create an unmounted screen for `kind`
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            generation: 0,
            seq: 0,
            mounted: false,
            status: ListStatus::Idle,
            rows: Vec::new(),
            tombstones: HashSet::new(),
            latest_list: None,
            create_error: None,
        }
    }

    /// Entity kind this screen manages
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Whether the screen is mounted
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Collection load state
    #[must_use]
    pub const fn status(&self) -> &ListStatus {
        &self.status
    }

    /// Error from the last failed create
    #[must_use]
    pub fn create_error(&self) -> Option<&str> {
        self.create_error.as_deref()
    }

    /// Start a fresh cache; any response to an earlier ticket is discarded
    pub fn mount(&mut self) {
        self.reset();
        self.mounted = true;
    }

    /// Discard the cache and every in-flight request's effect
    pub fn unmount(&mut self) {
        self.reset();
        self.mounted = false;
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.status = ListStatus::Idle;
        self.rows.clear();
        self.tombstones.clear();
        self.latest_list = None;
        self.create_error = None;
    }

    /// Visible records, including optimistic creates and excluding pending deletes
    pub fn entities(&self) -> impl Iterator<Item = &ManagedEntity> {
        self.rows
            .iter()
            .filter(|row| !row.is_hidden())
            .map(|row| &row.entity)
    }

    /// Reconciliation state of a visible record
    #[must_use]
    pub fn entity_state(&self, id: Uuid) -> Option<&EntityState> {
        self.rows
            .iter()
            .find(|row| row.entity.id == id && !row.is_hidden())
            .map(|row| &row.state)
    }

    /// Render-ready snapshot
    #[must_use]
    pub fn view(&self) -> ScreenView {
        ScreenView {
            status: self.status.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| !row.is_hidden())
                .map(Row::view)
                .collect(),
            create_error: self.create_error.clone(),
            creating: self.rows.iter().any(|row| {
                matches!(
                    row.state,
                    EntityState::Pending {
                        action: Action::Create,
                        ..
                    }
                )
            }),
        }
    }

    const fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    const fn ticket(&self, seq: u64, target: Option<Uuid>) -> Ticket {
        Ticket {
            generation: self.generation,
            seq,
            target,
        }
    }

    const fn is_current(&self, ticket: Ticket) -> bool {
        self.mounted && ticket.generation == self.generation
    }

    fn ensure_mounted(&self) -> Result<()> {
        if self.mounted {
            Ok(())
        } else {
            Err(Error::Other(format!(
                "{} screen is not mounted",
                self.kind.label()
            )))
        }
    }

    fn not_found(&self, id: Uuid) -> Error {
        Error::NotFound {
            resource: format!("{}/{id}", self.kind),
        }
    }

    fn visible_row(&self, id: Uuid) -> Result<&Row> {
        self.rows
            .iter()
            .find(|row| row.entity.id == id && !row.is_hidden())
            .ok_or_else(|| self.not_found(id))
    }

    fn visible_row_mut(&mut self, id: Uuid) -> Result<&mut Row> {
        let missing = self.not_found(id);
        self.rows
            .iter_mut()
            .find(|row| row.entity.id == id && !row.is_hidden())
            .ok_or(missing)
    }

    /// Request the collection
    ///
    /// # Errors
    ///
    /// Returns an error if the screen is not mounted.
    pub fn begin_list(&mut self) -> Result<Ticket> {
        self.ensure_mounted()?;
        let seq = self.next_seq();
        self.latest_list = Some(seq);
        self.status = ListStatus::Loading;
        Ok(self.ticket(seq, None))
    }

    /// Reconcile a list response
    ///
    /// Records with a newer local change or an in-flight mutation keep their local
    /// value. Confirmed records missing from the response are dropped, and deleted
    /// records are never resurrected. A failed list leaves the cache empty apart
    /// from records with in-flight mutations.
    pub fn finish_list(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<ManagedEntity>>,
    ) -> Outcome {
        if !self.is_current(ticket) || self.latest_list != Some(ticket.seq) {
            return Outcome::Discarded;
        }
        self.latest_list = None;

        let entities = match result {
            Ok(entities) => entities,
            Err(err) => {
                self.rows.retain(Row::is_pending);
                self.status = ListStatus::Failed(err.user_message());
                return Outcome::Failed;
            }
        };

        let listed: HashSet<Uuid> = entities.iter().map(|entity| entity.id).collect();
        let mut rows = Vec::with_capacity(entities.len());
        let mut local = HashMap::new();
        for row in std::mem::take(&mut self.rows) {
            if listed.contains(&row.entity.id) {
                local.insert(row.entity.id, row);
            } else if row.is_newer_than(ticket.seq) {
                rows.push(row);
            }
        }

        for entity in entities {
            if self.tombstones.contains(&entity.id) {
                continue;
            }
            let row = match local.remove(&entity.id) {
                Some(row) if row.is_newer_than(ticket.seq) => row,
                Some(row) => Row {
                    state: row.state,
                    ..Row::confirmed(entity, ticket.seq)
                },
                None => Row::confirmed(entity, ticket.seq),
            };
            rows.push(row);
        }

        self.rows = rows;
        self.status = ListStatus::Ready;
        Outcome::Applied
    }

    /// Validate `fields` and insert an optimistic record
    ///
    /// # Errors
    ///
    /// Returns a validation error without touching the cache if a required field
    /// is missing or a value does not match the schema.
    pub fn begin_create(&mut self, fields: Fields) -> Result<Ticket> {
        self.ensure_mounted()?;
        self.kind.validate(&fields, ValidationMode::Create)?;

        let seq = self.next_seq();
        let now = Utc::now();
        let entity = ManagedEntity {
            id: Uuid::new_v4(),
            kind: self.kind,
            fields,
            created_at: now,
            updated_at: now,
        };
        let target = entity.id;

        self.rows.insert(
            0,
            Row {
                entity,
                state: EntityState::Pending {
                    action: Action::Create,
                    original: None,
                },
                revision: seq,
                op: Some(seq),
            },
        );
        self.create_error = None;
        Ok(self.ticket(seq, Some(target)))
    }

    /// Replace the optimistic record with the stored one, or drop it on failure
    pub fn finish_create(&mut self, ticket: Ticket, result: Result<ManagedEntity>) -> Outcome {
        if !self.is_current(ticket) {
            return Outcome::Discarded;
        }
        if let Some(placeholder) = ticket.target {
            self.rows.retain(|row| row.entity.id != placeholder);
        }

        match result {
            Ok(entity) => {
                let revision = self.next_seq();
                self.upsert_confirmed(entity, revision);
                Outcome::Applied
            }
            Err(err) => {
                self.create_error = Some(err.user_message());
                Outcome::Failed
            }
        }
    }

    fn upsert_confirmed(&mut self, entity: ManagedEntity, revision: u64) {
        if self.tombstones.contains(&entity.id) {
            return;
        }
        match self.rows.iter_mut().find(|row| row.entity.id == entity.id) {
            Some(row) => *row = Row::confirmed(entity, revision),
            None => self.rows.insert(0, Row::confirmed(entity, revision)),
        }
    }

    /// Validate `changes` and apply them optimistically to record `id`
    ///
    /// Updates may be stacked; only the response to the latest one decides the
    /// final state, and a failure reverts to the last confirmed value.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is not visible, is still being created, or
    /// the changes fail schema validation.
    pub fn begin_update(&mut self, id: Uuid, changes: &Fields) -> Result<Ticket> {
        self.ensure_mounted()?;
        if matches!(
            self.visible_row(id)?.state,
            EntityState::Pending {
                action: Action::Create,
                ..
            }
        ) {
            return Err(Error::Conflict {
                message: "record is still being created".to_string(),
            });
        }
        self.kind.validate(changes, ValidationMode::Update)?;

        let seq = self.next_seq();
        let row = self.visible_row_mut(id)?;
        let original = match &row.state {
            EntityState::Pending { original, .. } => original.clone(),
            EntityState::Confirmed | EntityState::Failed(_) => Some(row.entity.clone()),
        };
        row.entity.merge(changes);
        row.state = EntityState::Pending {
            action: Action::Update,
            original,
        };
        row.revision = seq;
        row.op = Some(seq);
        Ok(self.ticket(seq, Some(id)))
    }

    /// Reconcile an update response
    pub fn finish_update(&mut self, ticket: Ticket, result: Result<ManagedEntity>) -> Outcome {
        if !self.is_current(ticket) {
            return Outcome::Discarded;
        }
        let Some(id) = ticket.target else {
            return Outcome::Discarded;
        };
        let revision = self.next_seq();
        let Some(row) = self.rows.iter_mut().find(|row| row.entity.id == id) else {
            return Outcome::Discarded;
        };

        if row.op != Some(ticket.seq) {
            // Superseded: a successful older write becomes the value to revert to.
            if let (
                Ok(entity),
                EntityState::Pending {
                    action: Action::Update,
                    original: Some(original),
                },
            ) = (result, &mut row.state)
            {
                *original = entity;
            }
            return Outcome::Discarded;
        }

        row.op = None;
        row.revision = revision;
        match result {
            Ok(entity) => {
                row.entity = entity;
                row.state = EntityState::Confirmed;
                Outcome::Applied
            }
            Err(err) => {
                let failed = EntityState::Failed(err.user_message());
                if let EntityState::Pending {
                    original: Some(original),
                    ..
                } = std::mem::replace(&mut row.state, failed)
                {
                    row.entity = original;
                }
                Outcome::Failed
            }
        }
    }

    /// Hide record `id` pending its removal
    ///
    /// # Errors
    ///
    /// Returns an error if the record is not visible or has another mutation in
    /// flight.
    pub fn begin_delete(&mut self, id: Uuid) -> Result<Ticket> {
        self.ensure_mounted()?;
        if self.visible_row(id)?.is_pending() {
            return Err(Error::Conflict {
                message: "record has a change in flight".to_string(),
            });
        }

        let seq = self.next_seq();
        let row = self.visible_row_mut(id)?;
        row.state = EntityState::Pending {
            action: Action::Delete,
            original: Some(row.entity.clone()),
        };
        row.revision = seq;
        row.op = Some(seq);
        Ok(self.ticket(seq, Some(id)))
    }

    /// Reconcile a delete response
    ///
    /// A not-found response counts as success: the record is gone either way.
    pub fn finish_delete(&mut self, ticket: Ticket, result: Result<()>) -> Outcome {
        if !self.is_current(ticket) {
            return Outcome::Discarded;
        }
        let Some(id) = ticket.target else {
            return Outcome::Discarded;
        };
        let Some(index) = self
            .rows
            .iter()
            .position(|row| row.entity.id == id && row.op == Some(ticket.seq))
        else {
            return Outcome::Discarded;
        };

        match result {
            Ok(()) | Err(Error::NotFound { .. }) => {
                self.rows.remove(index);
                self.tombstones.insert(id);
                Outcome::Applied
            }
            Err(err) => {
                let revision = self.next_seq();
                let Some(row) = self.rows.get_mut(index) else {
                    return Outcome::Discarded;
                };
                row.op = None;
                row.revision = revision;
                let failed = EntityState::Failed(err.user_message());
                if let EntityState::Pending {
                    original: Some(original),
                    ..
                } = std::mem::replace(&mut row.state, failed)
                {
                    row.entity = original;
                }
                Outcome::Failed
            }
        }
    }

    /// Clear the inline error of record `id`
    pub fn dismiss_error(&mut self, id: Uuid) {
        if let Some(row) = self
            .rows
            .iter_mut()
            .find(|row| row.entity.id == id && matches!(row.state, EntityState::Failed(_)))
        {
            row.state = EntityState::Confirmed;
        }
    }

    /// Clear the create form error
    pub fn dismiss_create_error(&mut self) {
        self.create_error = None;
    }
}

type Observer = Box<dyn Fn(&ScreenView)>;

/// Drives a [`ScreenState`] against a backing store
///
/// All methods take `&self` and never hold the state borrow across an await, so
/// several operations may be in flight at once on a single-threaded executor.
/// The observer is called with a fresh [`ScreenView`] after every transition and
/// must not call back into the screen synchronously.
pub struct ManagementScreen<S> {
    store: S,
    state: RefCell<ScreenState>,
    observer: RefCell<Option<Observer>>,
}

impl<S> std::fmt::Debug for ManagementScreen<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagementScreen")
            .field("state", &self.state)
            .field("observed", &self.observer.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl<S: EntityStore> ManagementScreen<S> {
    /// Create an unmounted screen for `kind`
    pub fn new(kind: EntityKind, store: S) -> Self {
        Self {
            store,
            state: RefCell::new(ScreenState::new(kind)),
            observer: RefCell::new(None),
        }
    }

    /// Register the change observer, replacing any previous one
    pub fn on_change(&self, observer: impl Fn(&ScreenView) + 'static) {
        *self.observer.borrow_mut() = Some(Box::new(observer));
    }

    /// Entity kind this screen manages
    pub fn kind(&self) -> EntityKind {
        self.state.borrow().kind()
    }

    /// Current render-ready snapshot
    pub fn view(&self) -> ScreenView {
        self.state.borrow().view()
    }

    /// Borrow the underlying state
    pub fn with_state<R>(&self, f: impl FnOnce(&ScreenState) -> R) -> R {
        f(&self.state.borrow())
    }

    fn notify(&self) {
        if let Some(observer) = self.observer.borrow().as_ref() {
            let view = self.state.borrow().view();
            observer(&view);
        }
    }

    /// Mount the screen with an empty cache
    pub fn mount(&self) {
        self.state.borrow_mut().mount();
        self.notify();
    }

    /// Unmount the screen; late responses are discarded
    pub fn unmount(&self) {
        self.state.borrow_mut().unmount();
        self.notify();
    }

    /// Fetch the collection; call again to retry after a failure
    ///
    /// # Errors
    ///
    /// Returns an error only if the screen is not mounted. Store failures are
    /// recorded in [`ListStatus::Failed`].
    pub async fn load(&self) -> Result<Outcome> {
        let ticket = self.state.borrow_mut().begin_list()?;
        self.notify();

        let kind = self.kind();
        let result = self.store.list(kind).await;
        if let Err(err) = &result {
            tracing::warn!(%kind, error = %err, "Failed to load collection");
        }

        let outcome = self.state.borrow_mut().finish_list(ticket, result);
        self.notify();
        Ok(outcome)
    }

    /// Create a record from `fields`
    ///
    /// # Errors
    ///
    /// Returns validation errors immediately, before any store call. Store
    /// failures are reported through [`ScreenView::create_error`].
    pub async fn create(&self, fields: Fields) -> Result<Outcome> {
        let ticket = self.state.borrow_mut().begin_create(fields.clone())?;
        self.notify();

        let kind = self.kind();
        let result = self.store.create(kind, &fields).await;
        if let Err(err) = &result {
            tracing::warn!(%kind, error = %err, "Failed to create record");
        }

        let outcome = self.state.borrow_mut().finish_create(ticket, result);
        self.notify();
        Ok(outcome)
    }

    /// Apply `changes` to record `id`
    ///
    /// # Errors
    ///
    /// Returns validation and state errors immediately. Store failures revert the
    /// record and are reported on its row.
    pub async fn update(&self, id: Uuid, changes: Fields) -> Result<Outcome> {
        let ticket = self.state.borrow_mut().begin_update(id, &changes)?;
        self.notify();

        let kind = self.kind();
        let result = self.store.update(kind, id, &changes).await;
        if let Err(err) = &result {
            tracing::warn!(%kind, %id, error = %err, "Failed to update record");
        }

        let outcome = self.state.borrow_mut().finish_update(ticket, result);
        self.notify();
        Ok(outcome)
    }

    /// Delete record `id`
    ///
    /// # Errors
    ///
    /// Returns state errors immediately. Store failures restore the record and
    /// are reported on its row.
    pub async fn delete(&self, id: Uuid) -> Result<Outcome> {
        let ticket = self.state.borrow_mut().begin_delete(id)?;
        self.notify();

        let kind = self.kind();
        let result = self.store.delete(kind, id).await;
        if let Err(err) = &result {
            tracing::warn!(%kind, %id, error = %err, "Failed to delete record");
        }

        let outcome = self.state.borrow_mut().finish_delete(ticket, result);
        self.notify();
        Ok(outcome)
    }

    /// Clear the inline error of record `id`
    pub fn dismiss_error(&self, id: Uuid) {
        self.state.borrow_mut().dismiss_error(id);
        self.notify();
    }

    /// Clear the create form error
    pub fn dismiss_create_error(&self) {
        self.state.borrow_mut().dismiss_create_error();
        self.notify();
    }
}
