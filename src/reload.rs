//! Helicopter reload state machine, evaluated once per control-loop tick.
//!
//! | state     | docked | guard / timer          | next      | event        |
//! |-----------|--------|------------------------|-----------|--------------|
//! | Normal    | no     |                        | Normal    | `Idle`       |
//! | Normal    | yes    | depot stocked and idle | Reloading | `Started`    |
//! | Normal    | yes    | otherwise              | Normal    | `Waiting`    |
//! | Reloading | yes    | elapsed < duration     | Reloading | `InProgress` |
//! | Reloading | yes    | elapsed ≥ duration     | Normal    | `Completed`  |
//! | Reloading | no     |                        | Normal    | `Cancelled`  |
//!
//! Docking is re-tested every tick so flying away releases the depot at once.

use std::time::{Duration, Instant};

use log::info;

use crate::depot::{Depot, ReloadGate};
use crate::entities::{Helicopter, Notice, ReloadState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReloadEvent {
    Idle,
    Waiting(ReloadGate),
    Started,
    InProgress,
    Completed { loaded: u32 },
    Cancelled,
}

impl ReloadEvent {
    pub fn notice(self) -> Option<Notice> {
        match self {
            ReloadEvent::Idle => None,
            ReloadEvent::Waiting(_) => Some(Notice::WaitingToReload),
            ReloadEvent::Started | ReloadEvent::InProgress => Some(Notice::Reloading),
            ReloadEvent::Completed { .. } => Some(Notice::ReloadComplete),
            ReloadEvent::Cancelled => Some(Notice::ReloadCancelled),
        }
    }
}

pub fn advance(
    heli: &mut Helicopter,
    docked: bool,
    now: Instant,
    duration: Duration,
    depot: &Depot,
) -> ReloadEvent {
    match (heli.reload, docked) {
        (ReloadState::Normal, false) => ReloadEvent::Idle,
        (ReloadState::Normal, true) => match depot.begin_reload() {
            ReloadGate::Granted => {
                heli.reload = ReloadState::Reloading { started: now };
                info!("reload started");
                ReloadEvent::Started
            }
            gate => ReloadEvent::Waiting(gate),
        },
        (ReloadState::Reloading { started }, true) => {
            if now.saturating_duration_since(started) < duration {
                return ReloadEvent::InProgress;
            }
            let needed = heli.max_ammo.saturating_sub(heli.ammo);
            let loaded = depot.finish_reload(needed);
            heli.ammo = (heli.ammo + loaded).min(heli.max_ammo);
            heli.reload = ReloadState::Normal;
            info!("reload complete: +{loaded}, helicopter {}/{}", heli.ammo, heli.max_ammo);
            ReloadEvent::Completed { loaded }
        }
        (ReloadState::Reloading { .. }, false) => {
            depot.cancel_reload();
            heli.reload = ReloadState::Normal;
            info!("reload cancelled");
            ReloadEvent::Cancelled
        }
    }
}
