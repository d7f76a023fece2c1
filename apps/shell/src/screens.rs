//! Top-level screens and the host that mounts them.

use serde::{Deserialize, Serialize};
use storefront_events::{event_names, publish, EventBusRef, ScreenMountedEvent};
use storefront_gate::GateDecision;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// The four screens the shell can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    LoadingScreen,
    MaintenanceScreen,
    ClosedScreen,
    ApplicationRoot,
}

impl Screen {
    pub fn for_decision(decision: GateDecision) -> Self {
        match decision {
            GateDecision::Loading => Screen::LoadingScreen,
            GateDecision::Maintenance => Screen::MaintenanceScreen,
            GateDecision::Closed => Screen::ClosedScreen,
            GateDecision::Ready => Screen::ApplicationRoot,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Screen::LoadingScreen => "loading",
            Screen::MaintenanceScreen => "maintenance",
            Screen::ClosedScreen => "closed",
            Screen::ApplicationRoot => "app",
        }
    }

    /// Banner shown in headless mode.
    pub fn banner(&self) -> &'static str {
        match self {
            Screen::LoadingScreen => "Loading the store...",
            Screen::MaintenanceScreen => "We're doing some maintenance. Please check back soon.",
            Screen::ClosedScreen => "The store is currently closed.",
            Screen::ApplicationRoot => "Welcome! The store is open.",
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Owner of screen selection. Mounts the screen for each pushed decision.
pub struct ScreenHost {
    events: EventBusRef,
    mounted: Option<Screen>,
    mount_count: u64,
}

impl ScreenHost {
    pub fn new(events: EventBusRef) -> Self {
        Self {
            events,
            mounted: None,
            mount_count: 0,
        }
    }

    pub fn mounted(&self) -> Option<Screen> {
        self.mounted
    }

    pub fn mount_count(&self) -> u64 {
        self.mount_count
    }

    /// Mount the screen for `decision`. Returns false if it is already mounted.
    pub fn mount(&mut self, decision: GateDecision) -> bool {
        let screen = Screen::for_decision(decision);
        if self.mounted == Some(screen) {
            return false;
        }

        if let Some(previous) = self.mounted {
            tracing::debug!(screen = %previous, "unmounting screen");
        }
        self.mounted = Some(screen);
        self.mount_count += 1;

        tracing::info!(screen = %screen, decision = %decision, "{}", screen.banner());
        publish(
            self.events.as_ref(),
            event_names::SCREEN_MOUNTED,
            &ScreenMountedEvent {
                screen: screen.id().to_string(),
                decision,
                mount_count: self.mount_count,
            },
        );
        true
    }

    /// Follow a decision stream until cancelled or the stream closes.
    pub async fn run(
        mut self,
        mut decisions: watch::Receiver<GateDecision>,
        cancel: CancellationToken,
    ) -> Self {
        loop {
            let decision = *decisions.borrow_and_update();
            self.mount(decision);

            // Drain a pending decision before honouring cancellation
            tokio::select! {
                biased;
                res = decisions.changed() => {
                    if res.is_err() {
                        break;
                    }
                }
                _ = cancel.cancelled() => break,
            }
        }
        self
    }
}
