use std::any::{TypeId, type_name};
use std::collections::BTreeMap;

use flume::{Receiver, Sender};
use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::updater::Update;
use crate::{
    Command, CommandFuture, CommandSnapshot, Compute, Dep, Error, State, StateSyncStatus,
    TaskHandle, TaskId, Updater,
};

pub(crate) struct ComputeEntry {
    pub(crate) value: Box<dyn Compute>,
    pub(crate) status: StateSyncStatus,
}

/// Owner of every state, compute and command of the application.
///
/// All mutation happens on the thread holding the context: commands run as
/// tasks and publish through an [`Updater`], and [`StateCtx::sync_computes`]
/// applies what they sent, in send order.
///
/// Typical frame:
/// 1. `sync_computes()` to pick up finished work
/// 2. read with `state`/`cached`, write inputs with `update`
/// 3. `enqueue_command::<C>()` then `flush_commands()` for user actions
/// 4. `run_all_dirty()` so derived computes follow their inputs
pub struct StateCtx {
    states: BTreeMap<TypeId, Box<dyn State>>,
    computes: BTreeMap<TypeId, ComputeEntry>,
    commands: BTreeMap<TypeId, Box<dyn Command>>,

    command_queue: Vec<TypeId>,
    generations: BTreeMap<TypeId, u64>,
    running: BTreeMap<TypeId, TaskHandle>,

    send: Sender<Update>,
    recv: Receiver<Update>,

    #[cfg(not(target_arch = "wasm32"))]
    tasks: tokio::task::JoinSet<()>,
    #[cfg(target_arch = "wasm32")]
    in_flight: std::rc::Rc<std::cell::Cell<usize>>,
}

impl Default for StateCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StateCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCtx")
            .field("states", &self.states.len())
            .field("computes", &self.computes.len())
            .field("commands", &self.commands.len())
            .field("queued", &self.command_queue.len())
            .field("tasks", &self.task_count())
            .finish_non_exhaustive()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        let (send, recv) = flume::unbounded();
        Self {
            states: BTreeMap::new(),
            computes: BTreeMap::new(),
            commands: BTreeMap::new(),
            command_queue: Vec::new(),
            generations: BTreeMap::new(),
            running: BTreeMap::new(),
            send,
            recv,
            #[cfg(not(target_arch = "wasm32"))]
            tasks: tokio::task::JoinSet::new(),
            #[cfg(target_arch = "wasm32")]
            in_flight: std::rc::Rc::default(),
        }
    }

    pub fn add_state<T: State>(&mut self, state: T) {
        let id = TypeId::of::<T>();
        self.states.insert(id, Box::new(state));
        self.mark_dependents_dirty(id);
    }

    pub fn record_compute<T: Compute>(&mut self, compute: T) {
        self.computes.insert(
            TypeId::of::<T>(),
            ComputeEntry {
                value: Box::new(compute),
                status: StateSyncStatus::Init,
            },
        );
    }

    /// Registers `command`, replacing any earlier instance of the same type.
    ///
    /// Commands that carry data are re-recorded with fresh values before each
    /// dispatch.
    pub fn record_command<T: Command>(&mut self, command: T) {
        self.commands.insert(TypeId::of::<T>(), Box::new(command));
    }

    pub fn try_state<T: State>(&self) -> Result<&T, Error> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|state| state.as_any().downcast_ref::<T>())
            .ok_or_else(|| Error::state_not_found(type_name::<T>(), "StateCtx::state"))
    }

    /// # Panics
    /// Panics if `T` was never registered.
    pub fn state<T: State>(&self) -> &T {
        self.try_state::<T>().unwrap_or_else(|err| panic!("{err}"))
    }

    /// Mutable access to a state. Computes depending on `T` become dirty.
    ///
    /// # Panics
    /// Panics if `T` was never registered.
    pub fn state_mut<T: State>(&mut self) -> &mut T {
        let id = TypeId::of::<T>();
        self.mark_dependents_dirty(id);
        self.states
            .get_mut(&id)
            .and_then(|state| state.as_any_mut().downcast_mut::<T>())
            .unwrap_or_else(|| {
                panic!(
                    "{}",
                    Error::state_not_found(type_name::<T>(), "StateCtx::state_mut")
                )
            })
    }

    pub fn update<T: State>(&mut self, f: impl FnOnce(&mut T)) {
        f(self.state_mut::<T>());
    }

    pub fn cached<T: Compute>(&self) -> Option<&T> {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.value.as_any().downcast_ref::<T>())
    }

    /// # Panics
    /// Panics if `T` was never recorded.
    pub fn compute<T: Compute>(&self) -> &T {
        self.cached::<T>().unwrap_or_else(|| {
            panic!(
                "{}",
                Error::compute_not_found(type_name::<T>(), "StateCtx::compute")
            )
        })
    }

    pub fn sync_status<T: Compute>(&self) -> Option<StateSyncStatus> {
        self.computes
            .get(&TypeId::of::<T>())
            .map(|entry| entry.status)
    }

    pub fn updater(&self) -> Updater {
        Updater::new(self.send.clone())
    }

    /// Applies every value published through an [`Updater`] since the last call.
    pub fn sync_computes(&mut self) {
        let updates: Vec<Update> = self.recv.try_iter().collect();
        for (id, value) in updates {
            if let Some(entry) = self.computes.get_mut(&id) {
                entry.value.assign_box(value);
            } else if let Some(state) = self.states.get_mut(&id) {
                state.assign_box(value);
            } else {
                warn!("Dropping update for unregistered type {id:?}");
                continue;
            }
            self.mark_dependents_dirty(id);
        }

        #[cfg(not(target_arch = "wasm32"))]
        self.reap_finished_tasks();
    }

    /// Runs every compute that was never run or whose deps changed.
    ///
    /// Results arrive through the updater, so they become visible on the
    /// next `sync_computes`.
    pub fn run_all_dirty(&mut self) {
        let dirty: Vec<TypeId> = self
            .computes
            .iter()
            .filter(|(_, entry)| entry.status.needs_run())
            .map(|(id, _)| *id)
            .collect();

        for id in dirty {
            let updater = self.updater();
            if let Some(entry) = self.computes.get(&id) {
                entry
                    .value
                    .compute(Dep::new(&self.states, &self.computes), updater);
            }
            if let Some(entry) = self.computes.get_mut(&id) {
                entry.status = StateSyncStatus::Clean;
            }
        }
    }

    pub fn enqueue_command<T: Command>(&mut self) {
        let id = TypeId::of::<T>();
        if self.commands.contains_key(&id) {
            self.command_queue.push(id);
        } else {
            warn!(
                "{}",
                Error::command_not_found(type_name::<T>(), "StateCtx::enqueue_command")
            );
        }
    }

    /// Spawns every queued command.
    ///
    /// A command flushed while an older run of the same type is still
    /// registered cancels that older run first.
    pub fn flush_commands(&mut self) {
        for id in std::mem::take(&mut self.command_queue) {
            let generation = {
                let counter = self.generations.entry(id).or_insert(0);
                *counter += 1;
                *counter
            };
            let handle = TaskHandle::new(TaskId::new(id, generation), CancellationToken::new());
            if let Some(previous) = self.running.insert(id, handle.clone()) {
                debug!(
                    "Cancelling command generation {} in favour of {}",
                    previous.id().generation(),
                    generation
                );
                previous.cancel();
            }

            let snapshot = self.snapshot();
            let updater = self.updater();
            let Some(command) = self.commands.get(&id) else {
                continue;
            };
            let future = command.run(snapshot, updater, handle);
            self.spawn(future);
        }
    }

    /// Cancels every running command and stops waiting for them.
    pub fn cancel_all(&mut self) {
        for handle in std::mem::take(&mut self.running).into_values() {
            handle.cancel();
        }
        #[cfg(not(target_arch = "wasm32"))]
        self.tasks.abort_all();
    }

    pub async fn shutdown(&mut self) {
        for handle in std::mem::take(&mut self.running).into_values() {
            handle.cancel();
        }
        #[cfg(not(target_arch = "wasm32"))]
        self.tasks.shutdown().await;
    }

    pub fn task_count(&self) -> usize {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.tasks.len()
        }
        #[cfg(target_arch = "wasm32")]
        {
            self.in_flight.get()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn task_set_mut(&mut self) -> &mut tokio::task::JoinSet<()> {
        &mut self.tasks
    }

    fn snapshot(&self) -> CommandSnapshot {
        let mut snapshot = CommandSnapshot::new();
        for (id, state) in &self.states {
            if let Some(value) = state.snapshot() {
                snapshot.insert_state(*id, value);
            }
        }
        for (id, entry) in &self.computes {
            if let Some(value) = entry.value.snapshot() {
                snapshot.insert_compute(*id, value);
            }
        }
        snapshot
    }

    fn mark_dependents_dirty(&mut self, id: TypeId) {
        for entry in self.computes.values_mut() {
            let (states, computes) = entry.value.deps();
            if states.contains(&id) || computes.contains(&id) {
                entry.status = StateSyncStatus::Dirty;
            }
        }
    }

    /// Outside a Tokio runtime the future is dropped unpolled; whatever the
    /// command published from `run` still applies.
    #[cfg(not(target_arch = "wasm32"))]
    fn spawn(&mut self, future: CommandFuture) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                self.tasks.spawn_on(future, &handle);
            }
            Err(err) => warn!("Command not spawned: {err}"),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn spawn(&mut self, future: CommandFuture) {
        let in_flight = self.in_flight.clone();
        in_flight.set(in_flight.get() + 1);
        wasm_bindgen_futures::spawn_local(async move {
            future.await;
            in_flight.set(in_flight.get().saturating_sub(1));
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn reap_finished_tasks(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(err) = result {
                if err.is_panic() {
                    log::error!("Command task panicked: {err}");
                } else {
                    debug!("Command task cancelled: {err}");
                }
            }
        }
    }
}
