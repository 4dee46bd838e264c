//! The single task that owns every piece of client state.
//!
//! Everything that can happen to the client is a [`ClientEvent`] posted into
//! one bounded queue: inbound recognition frames, connectivity edges, user
//! actions, and indicator timer firings.  The loop handles one event to
//! completion before taking the next, so no two dispatches and no two
//! indicator transitions ever interleave.
//!
//! # Indicator timers
//!
//! ```text
//!  ConnectivityIndicator ──TimerTicket──► spawn(sleep(delay))
//!          ▲                                      │
//!          └──────── ClientEvent::TimerFired(id) ◄┘
//! ```
//!
//! At most one sleep task exists at a time.  A superseding signal aborts the
//! running task, and the indicator ignores any firing whose ticket it no
//! longer holds, so a late timer can never hide a freshly shown badge.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use voicemap_core::{
    ConnectivityIndicator, IndicatorUpdate, Inbound, LayerSelection, TimerTicket,
};

use super::control_surface::ControlSurface;
use super::dispatch_command::CommandDispatcher;

/// Edge-triggered reachability change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivitySignal {
    Online,
    Offline,
}

/// Something the user did through the controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    ToggleMic,
    SelectLayer(LayerSelection),
    DeleteHistory(u64),
    ShowHistory,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Transport(Inbound),
    Connectivity(ConnectivitySignal),
    TimerFired(u64),
    User(UserAction),
    Shutdown,
}

pub struct EventLoop {
    dispatcher: CommandDispatcher,
    surface: ControlSurface,
    indicator: ConnectivityIndicator,
    events: mpsc::Receiver<ClientEvent>,
    timer_tx: mpsc::WeakSender<ClientEvent>,
    pending_timer: Option<JoinHandle<()>>,
}

impl EventLoop {
    /// Builds the loop and returns the sender every producer should clone.
    ///
    /// The loop holds only a weak handle to its own queue; it stops once
    /// every producer's sender has been dropped or on
    /// [`ClientEvent::Shutdown`].
    pub fn new(
        dispatcher: CommandDispatcher,
        surface: ControlSurface,
        indicator: ConnectivityIndicator,
        capacity: usize,
    ) -> (Self, mpsc::Sender<ClientEvent>) {
        let (tx, events) = mpsc::channel(capacity);
        let event_loop = Self {
            dispatcher,
            surface,
            indicator,
            events,
            timer_tx: tx.downgrade(),
            pending_timer: None,
        };
        (event_loop, tx)
    }

    /// Processes events until shutdown, then hands the state back.
    pub async fn run(mut self) -> Self {
        self.render_all();
        while let Some(event) = self.events.recv().await {
            if !self.handle(event).await {
                break;
            }
        }
        if let Some(timer) = self.pending_timer.take() {
            timer.abort();
        }
        info!("event loop stopped");
        self
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    pub fn indicator(&self) -> &ConnectivityIndicator {
        &self.indicator
    }

    pub fn surface(&self) -> &ControlSurface {
        &self.surface
    }

    /// Renders every UI element from current state.
    pub fn render_all(&mut self) {
        self.surface.show_layer(self.dispatcher.layers().current());
        self.surface.show_history(self.dispatcher.history().entries());
        self.surface.show_indicator(&self.indicator.view());
        let map = self.dispatcher.map();
        let (center, zoom) = (map.center(), map.zoom());
        self.surface.show_view(center, zoom);
    }

    /// Returns `false` when the loop should stop.
    async fn handle(&mut self, event: ClientEvent) -> bool {
        match event {
            ClientEvent::Transport(inbound) => {
                self.on_inbound(inbound);
                self.surface.after_message().await;
            }
            ClientEvent::Connectivity(ConnectivitySignal::Online) => {
                let update = self.indicator.on_online();
                self.apply(update);
            }
            ClientEvent::Connectivity(ConnectivitySignal::Offline) => {
                let update = self.indicator.on_offline();
                self.apply(update);
            }
            ClientEvent::TimerFired(id) => {
                let update = self.indicator.on_timer(id);
                self.apply(update);
            }
            ClientEvent::User(action) => self.on_user(action).await,
            ClientEvent::Shutdown => return false,
        }
        true
    }

    fn on_inbound(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::Command(command) => {
                let report = self.dispatcher.dispatch(command);
                if let Some(layer) = report.layer {
                    self.surface.show_layer(layer);
                }
                if report.history_changed {
                    self.surface.show_history(self.dispatcher.history().entries());
                }
                let map = self.dispatcher.map();
                let (center, zoom) = (map.center(), map.zoom());
                self.surface.show_view(center, zoom);
            }
            Inbound::RecognitionError(message) => warn!("recognition error: {message}"),
            Inbound::Dropped(reason) => warn!("dropped inbound message: {reason}"),
        }
    }

    async fn on_user(&mut self, action: UserAction) {
        match action {
            UserAction::ToggleMic => {
                let active = self.surface.toggle_mic().await;
                info!(active, "voice capture toggled");
            }
            UserAction::SelectLayer(layer) => {
                let current = self.dispatcher.select_layer(layer);
                self.surface.show_layer(current);
            }
            UserAction::DeleteHistory(id) => {
                if !self.dispatcher.delete_history(id) {
                    debug!("no history entry with id {id}");
                }
                self.surface.show_history(self.dispatcher.history().entries());
            }
            UserAction::ShowHistory => {
                self.surface.show_history(self.dispatcher.history().entries());
            }
        }
    }

    fn apply(&mut self, update: IndicatorUpdate) {
        if let Some(stale) = update.cancel {
            if let Some(timer) = self.pending_timer.take() {
                timer.abort();
                debug!(ticket = stale, "indicator timer aborted");
            }
        }
        if let Some(ticket) = update.schedule {
            self.schedule(ticket);
        }
        if update.changed {
            self.surface.show_indicator(&self.indicator.view());
        }
    }

    fn schedule(&mut self, ticket: TimerTicket) {
        if let Some(previous) = self.pending_timer.take() {
            previous.abort();
        }
        let tx = self.timer_tx.clone();
        self.pending_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(ticket.delay).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(ClientEvent::TimerFired(ticket.id)).await;
            }
        }));
    }
}
