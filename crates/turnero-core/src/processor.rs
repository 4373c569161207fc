//! Validating and applying operations to the [`StateStore`].
//!
//! [`apply`] is the only way the shared state changes. Each operation
//! checks its preconditions before touching the store, so a rejected
//! operation leaves state, stats, and `lastAction` exactly as they were.
//! The caller broadcasts a snapshot if and only if the result is
//! [`Outcome::Applied`].

use std::collections::HashSet;

use tracing::{debug, info};
use turnero_types::{Entry, EntryId, NONE_SERVED, OperationKind, Stats};

use crate::names::normalize;
use crate::operation::{Command, Operation, StateImport};
use crate::store::StateStore;

/// Result of an operation that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State changed; observers must receive a new snapshot.
    Applied(OperationKind),
    /// Valid but read-only (`PEEK`); nothing to broadcast.
    Unchanged,
}

/// Why an operation was refused. The state is untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The name is empty after normalization.
    #[error("name is empty after normalization")]
    EmptyName,

    /// No name in the batch survived normalization.
    #[error("no usable names in batch")]
    EmptyBatch,

    /// There is nobody to serve.
    #[error("queue is empty")]
    QueueEmpty,

    /// No entry has this id.
    #[error("no entry with id {0:?}")]
    EntryNotFound(EntryId),

    /// The move target falls outside the queue.
    #[error("cannot move entry at {from} by {dir} in a queue of {len}")]
    MoveOutOfRange {
        /// Current index of the entry.
        from: usize,
        /// Requested offset.
        dir: i64,
        /// Queue length.
        len: usize,
    },
}

/// Apply one command to the store.
///
/// Runs the daily rollover first, then validates and applies the operation
/// and stamps `lastAction` with the caller's id.
///
/// # Errors
///
/// Returns a [`Rejection`] when a precondition fails. Nothing is modified
/// in that case (apart from a due rollover, which is not a mutation an
/// observer can distinguish from a read).
pub fn apply(store: &mut StateStore, command: Command) -> Result<Outcome, Rejection> {
    store.ensure_rollover();

    let Command {
        operation,
        client_id,
    } = command;
    let kind = operation.kind();

    let result = dispatch(store, operation);
    match &result {
        Ok(Outcome::Applied(_)) => {
            store.record_action(kind, &client_id);
            info!(
                kind = %kind,
                by = %client_id,
                queue_len = store.len(),
                "Operation applied"
            );
        }
        Ok(Outcome::Unchanged) => {
            debug!(kind = %kind, by = %client_id, "Read-only operation, nothing to apply");
        }
        Err(reason) => {
            debug!(kind = %kind, by = %client_id, %reason, "Operation rejected");
        }
    }
    result
}

fn dispatch(store: &mut StateStore, operation: Operation) -> Result<Outcome, Rejection> {
    let kind = operation.kind();
    match operation {
        Operation::Peek => return Ok(Outcome::Unchanged),
        Operation::Enqueue { name } => enqueue(store, name.as_deref())?,
        Operation::BulkAdd { names } => bulk_add(store, &names)?,
        Operation::Dequeue => dequeue(store)?,
        Operation::ClearQueue => store.state_mut().queue.clear(),
        Operation::ResetAll => store.reset(),
        Operation::Move { id, dir } => move_entry(store, id, dir)?,
        Operation::Edit { id, name } => edit(store, id, name.as_deref())?,
        Operation::Delete { id } => delete(store, id)?,
        Operation::ImportState(import) => import_state(store, import),
    }
    Ok(Outcome::Applied(kind))
}

fn enqueue(store: &mut StateStore, name: Option<&str>) -> Result<(), Rejection> {
    let name = name.and_then(normalize).ok_or(Rejection::EmptyName)?;
    let created_at = store.now();
    store.state_mut().queue.push(Entry {
        id: EntryId::generate(),
        name,
        created_at,
    });
    Ok(())
}

fn bulk_add(store: &mut StateStore, names: &[String]) -> Result<(), Rejection> {
    let cleaned: Vec<String> = names.iter().filter_map(|n| normalize(n)).collect();
    if cleaned.is_empty() {
        return Err(Rejection::EmptyBatch);
    }
    let created_at = store.now();
    store
        .state_mut()
        .queue
        .extend(cleaned.into_iter().map(|name| Entry {
            id: EntryId::generate(),
            name,
            created_at,
        }));
    Ok(())
}

fn dequeue(store: &mut StateStore) -> Result<(), Rejection> {
    if store.is_empty() {
        return Err(Rejection::QueueEmpty);
    }
    let state = store.state_mut();
    let served = state.queue.remove(0);
    state.stats.served_today = state.stats.served_today.saturating_add(1);
    state.stats.last_served = served.name;
    Ok(())
}

fn move_entry(store: &mut StateStore, id: EntryId, dir: i64) -> Result<(), Rejection> {
    let queue = &mut store.state_mut().queue;
    let len = queue.len();
    let from = position_of(queue, &id).ok_or(Rejection::EntryNotFound(id))?;
    let to = i64::try_from(from)
        .ok()
        .and_then(|i| i.checked_add(dir))
        .and_then(|j| usize::try_from(j).ok())
        .filter(|&j| j < len)
        .ok_or(Rejection::MoveOutOfRange { from, dir, len })?;
    queue.swap(from, to);
    Ok(())
}

fn edit(store: &mut StateStore, id: EntryId, name: Option<&str>) -> Result<(), Rejection> {
    let name = name.and_then(normalize).ok_or(Rejection::EmptyName)?;
    let entry = store
        .state_mut()
        .queue
        .iter_mut()
        .find(|e| e.id == id)
        .ok_or(Rejection::EntryNotFound(id))?;
    entry.name = name;
    Ok(())
}

fn delete(store: &mut StateStore, id: EntryId) -> Result<(), Rejection> {
    let queue = &mut store.state_mut().queue;
    let index = position_of(queue, &id).ok_or(Rejection::EntryNotFound(id))?;
    queue.remove(index);
    Ok(())
}

/// Replace queue and stats from an export.
///
/// Entries without a usable name are dropped. Missing or repeated ids are
/// replaced with fresh ones so ids stay unique. The served count survives
/// only when the export was taken on the current civil day; the last served
/// name always survives.
fn import_state(store: &mut StateStore, import: StateImport) {
    let now = store.now();
    let today = store.today();

    let mut seen: HashSet<EntryId> = HashSet::new();
    let queue: Vec<Entry> = import
        .queue
        .into_iter()
        .filter_map(|imported| {
            let name = imported.name.as_deref().and_then(normalize)?;
            let id = imported
                .id
                .filter(|id| !seen.contains(id))
                .unwrap_or_else(EntryId::generate);
            seen.insert(id.clone());
            Some(Entry {
                id,
                name,
                created_at: imported.created_at.unwrap_or(now),
            })
        })
        .collect();

    let same_day = import.stats.day.as_deref() == Some(today.to_string().as_str());
    let served_today = if same_day {
        import.stats.served_today.unwrap_or(0)
    } else {
        0
    };
    let last_served = import
        .stats
        .last_served
        .as_deref()
        .and_then(normalize)
        .unwrap_or_else(|| NONE_SERVED.to_owned());

    let state = store.state_mut();
    state.queue = queue;
    state.stats = Stats {
        served_today,
        last_served,
        day: today,
    };
}

fn position_of(queue: &[Entry], id: &EntryId) -> Option<usize> {
    queue.iter().position(|e| &e.id == id)
}
