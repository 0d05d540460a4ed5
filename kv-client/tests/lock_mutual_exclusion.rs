// A model of the Lock's Acquire/Release protocol, checked with `stateright`
// for the mutual-exclusion invariant (see invariant 5 in the testable
// properties this protocol has to satisfy). The model tracks each client's
// *belief* about holding the lock against the store's ground truth, and
// lets every Put nondeterministically either apply or be dropped
// (surfacing as `ErrMaybe` to the real client) -- this is the state space
// a naive "just retry the Put" implementation gets wrong.

use stateright::{Checker, Model, Property};

const CLIENTS: usize = 2;
const STEP_BUDGET: u8 = 4;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
enum Stage {
    Trying,
    PendingAcquire,
    Holding,
    Releasing,
    PendingRelease,
    Finished,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
struct ClientState {
    stage: Stage,
    budget: u8,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
struct SysState {
    holder: Option<usize>,
    version: u64,
    clients: [ClientState; CLIENTS],
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
enum Action {
    /// Issue a CAS Put and have it land: `apply` true if the RPC is
    /// delivered and the reply comes back; false models a reply lost in
    /// flight (the store may still have committed).
    AcquireAttempt { client: usize, applied: bool },
    ReleaseAttempt { client: usize, applied: bool },
    /// A client in a pending (ambiguous) stage re-reads the store to
    /// resolve whether its last Put actually applied.
    Resolve { client: usize },
}

struct LockModel;

impl Model for LockModel {
    type State = SysState;
    type Action = Action;

    fn init_states(&self) -> Vec<Self::State> {
        vec![SysState {
            holder: None,
            version: 0,
            clients: [ClientState {
                stage: Stage::Trying,
                budget: STEP_BUDGET,
            }; CLIENTS],
        }]
    }

    fn actions(&self, state: &Self::State, actions: &mut Vec<Self::Action>) {
        for (client, cs) in state.clients.iter().enumerate() {
            if cs.budget == 0 {
                continue;
            }
            match cs.stage {
                Stage::Trying => {
                    if state.holder.is_none() {
                        actions.push(Action::AcquireAttempt {
                            client,
                            applied: true,
                        });
                        actions.push(Action::AcquireAttempt {
                            client,
                            applied: false,
                        });
                    }
                    // Held by someone else: the real client just sleeps and
                    // re-reads, which is a no-op at this model's grain.
                }
                Stage::PendingAcquire => actions.push(Action::Resolve { client }),
                Stage::Holding => {
                    actions.push(Action::ReleaseAttempt {
                        client,
                        applied: true,
                    });
                    actions.push(Action::ReleaseAttempt {
                        client,
                        applied: false,
                    });
                }
                Stage::PendingRelease => actions.push(Action::Resolve { client }),
                Stage::Releasing | Stage::Finished => {}
            }
        }
    }

    fn next_state(&self, last_state: &Self::State, action: Self::Action) -> Option<Self::State> {
        let mut state = last_state.clone();
        match action {
            Action::AcquireAttempt { client, applied } => {
                let cs = &mut state.clients[client];
                if cs.stage != Stage::Trying || state.holder.is_some() {
                    return None;
                }
                cs.budget -= 1;
                if applied {
                    state.holder = Some(client);
                    state.version += 1;
                    state.clients[client].stage = Stage::Holding;
                } else {
                    // Ambiguous: the CAS may have landed server-side even
                    // though this client can't tell. Resolve nondeterministically
                    // applied-but-unconfirmed via a later Resolve action.
                    state.clients[client].stage = Stage::PendingAcquire;
                    state.holder = Some(client);
                    state.version += 1;
                }
            }
            Action::ReleaseAttempt { client, applied } => {
                let cs = &mut state.clients[client];
                if cs.stage != Stage::Holding || state.holder != Some(client) {
                    return None;
                }
                cs.budget -= 1;
                if applied {
                    state.holder = None;
                    state.version += 1;
                    state.clients[client].stage = Stage::Finished;
                } else {
                    state.clients[client].stage = Stage::PendingRelease;
                    state.holder = None;
                    state.version += 1;
                }
            }
            Action::Resolve { client } => {
                let cs = &mut state.clients[client];
                cs.budget = cs.budget.saturating_sub(1);
                match cs.stage {
                    Stage::PendingAcquire => {
                        // The lock client's own Get, not an external write: it
                        // always observes the true current holder.
                        if state.holder == Some(client) {
                            state.clients[client].stage = Stage::Holding;
                        } else {
                            state.clients[client].stage = Stage::Trying;
                        }
                    }
                    Stage::PendingRelease => {
                        if state.holder != Some(client) {
                            state.clients[client].stage = Stage::Finished;
                        } else {
                            state.clients[client].stage = Stage::Holding;
                        }
                    }
                    _ => return None,
                }
            }
        }
        Some(state)
    }

    fn properties(&self) -> Vec<Property<Self>> {
        vec![
            Property::<Self>::always("at most one client holds the lock", |_, state| {
                state
                    .clients
                    .iter()
                    .filter(|c| c.stage == Stage::Holding)
                    .count()
                    <= 1
            }),
            Property::<Self>::always("a holding client agrees with store truth", |_, state| {
                state.clients.iter().enumerate().all(|(i, c)| {
                    c.stage != Stage::Holding || state.holder == Some(i)
                })
            }),
        ]
    }
}

#[test]
fn lock_mutual_exclusion_holds() {
    LockModel.checker().spawn_bfs().join().assert_properties();
}
