//! The online/offline badge state machine.
//!
//! ```text
//!            offline                 +show_delay
//!   Hidden ───────────► Appearing ───────────────► Appearing (entered)
//!     ▲                     │ online
//!     │                     ▼
//!     │   +fade         OnlineFlash ──+dwell──► Disappearing
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! The machine owns no clock.  Every transition that needs a delay returns a
//! [`TimerTicket`]; the caller sleeps and then feeds the ticket id back via
//! [`ConnectivityIndicator::on_timer`].  Each new signal supersedes the
//! pending ticket, so a late firing of an old ticket is recognised and
//! ignored instead of hiding a badge that was just re-shown.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const OFFLINE_MESSAGE: &str = "Offline";
pub const ONLINE_MESSAGE: &str = "Back Online!";

/// Where the badge is in its show/flash/fade cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectivityState {
    #[default]
    Hidden,
    Appearing,
    OnlineFlash,
    Disappearing,
}

/// Delays between the badge's timed transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorTimings {
    /// `Appearing` → entrance flag set.
    pub show_delay: Duration,
    /// `OnlineFlash` → `Disappearing`.
    pub dwell: Duration,
    /// `Disappearing` → `Hidden`.
    pub fade: Duration,
}

impl Default for IndicatorTimings {
    fn default() -> Self {
        Self {
            show_delay: Duration::from_millis(10),
            dwell: Duration::from_millis(1000),
            fade: Duration::from_millis(500),
        }
    }
}

/// Request to call [`ConnectivityIndicator::on_timer`] with `id` after
/// `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTicket {
    pub id: u64,
    pub delay: Duration,
}

/// What the caller must do after feeding a signal or timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndicatorUpdate {
    /// The view changed and should be re-rendered.
    pub changed: bool,
    /// Id of a previously scheduled ticket that is now stale.
    pub cancel: Option<u64>,
    /// A new ticket to schedule.
    pub schedule: Option<TimerTicket>,
}

/// Render model of the badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorView {
    pub visible: bool,
    /// Entrance animation applied.
    pub entered: bool,
    /// Positive ("back online") styling.
    pub online: bool,
    /// Exit animation applied.
    pub leaving: bool,
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerPurpose {
    Reveal,
    Dwell,
    Fade,
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    id: u64,
    purpose: TimerPurpose,
}

#[derive(Debug)]
pub struct ConnectivityIndicator {
    state: ConnectivityState,
    entered: bool,
    leaving: bool,
    pending: Option<PendingTimer>,
    next_ticket: u64,
    timings: IndicatorTimings,
}

impl Default for ConnectivityIndicator {
    fn default() -> Self {
        Self::new(IndicatorTimings::default())
    }
}

impl ConnectivityIndicator {
    pub fn new(timings: IndicatorTimings) -> Self {
        Self {
            state: ConnectivityState::Hidden,
            entered: false,
            leaving: false,
            pending: None,
            next_ticket: 0,
            timings,
        }
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    /// Id of the single outstanding ticket, if any.
    pub fn pending_ticket(&self) -> Option<u64> {
        self.pending.map(|p| p.id)
    }

    /// The network went away.
    pub fn on_offline(&mut self) -> IndicatorUpdate {
        if self.state == ConnectivityState::Appearing {
            debug!("offline while already appearing, ignored");
            return IndicatorUpdate::default();
        }
        let cancel = self.cancel_pending();
        self.state = ConnectivityState::Appearing;
        self.entered = false;
        self.leaving = false;
        let schedule = self.schedule(TimerPurpose::Reveal, self.timings.show_delay);
        IndicatorUpdate {
            changed: true,
            cancel,
            schedule: Some(schedule),
        }
    }

    /// The network came back.
    pub fn on_online(&mut self) -> IndicatorUpdate {
        if self.state == ConnectivityState::Hidden {
            debug!("online while hidden, ignored");
            return IndicatorUpdate::default();
        }
        let cancel = self.cancel_pending();
        self.state = ConnectivityState::OnlineFlash;
        self.entered = true;
        self.leaving = false;
        let schedule = self.schedule(TimerPurpose::Dwell, self.timings.dwell);
        IndicatorUpdate {
            changed: true,
            cancel,
            schedule: Some(schedule),
        }
    }

    /// A scheduled ticket elapsed.  Tickets that are no longer pending are
    /// ignored.
    pub fn on_timer(&mut self, id: u64) -> IndicatorUpdate {
        let purpose = match self.pending {
            Some(p) if p.id == id => p.purpose,
            _ => {
                debug!(ticket = id, "stale indicator timer ignored");
                return IndicatorUpdate::default();
            }
        };
        self.pending = None;

        match purpose {
            TimerPurpose::Reveal => {
                self.entered = true;
                IndicatorUpdate {
                    changed: true,
                    ..IndicatorUpdate::default()
                }
            }
            TimerPurpose::Dwell => {
                self.state = ConnectivityState::Disappearing;
                self.leaving = true;
                let schedule = self.schedule(TimerPurpose::Fade, self.timings.fade);
                IndicatorUpdate {
                    changed: true,
                    cancel: None,
                    schedule: Some(schedule),
                }
            }
            TimerPurpose::Fade => {
                self.state = ConnectivityState::Hidden;
                self.entered = false;
                self.leaving = false;
                IndicatorUpdate {
                    changed: true,
                    ..IndicatorUpdate::default()
                }
            }
        }
    }

    pub fn view(&self) -> IndicatorView {
        let (visible, online, message) = match self.state {
            ConnectivityState::Hidden => (false, false, ""),
            ConnectivityState::Appearing => (true, false, OFFLINE_MESSAGE),
            ConnectivityState::OnlineFlash | ConnectivityState::Disappearing => {
                (true, true, ONLINE_MESSAGE)
            }
        };
        IndicatorView {
            visible,
            entered: self.entered,
            online,
            leaving: self.leaving,
            message,
        }
    }

    fn cancel_pending(&mut self) -> Option<u64> {
        self.pending.take().map(|p| {
            debug!(ticket = p.id, "superseded indicator timer");
            p.id
        })
    }

    fn schedule(&mut self, purpose: TimerPurpose, delay: Duration) -> TimerTicket {
        self.next_ticket += 1;
        let id = self.next_ticket;
        self.pending = Some(PendingTimer { id, purpose });
        TimerTicket { id, delay }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(update: IndicatorUpdate) -> TimerTicket {
        update.schedule.expect("a timer should have been scheduled")
    }

    #[test]
    fn test_starts_hidden() {
        let indicator = ConnectivityIndicator::default();
        assert_eq!(indicator.state(), ConnectivityState::Hidden);
        assert!(!indicator.view().visible);
    }

    #[test]
    fn test_online_while_hidden_is_noop() {
        let mut indicator = ConnectivityIndicator::default();
        let update = indicator.on_online();
        assert_eq!(update, IndicatorUpdate::default());
        assert_eq!(indicator.state(), ConnectivityState::Hidden);
    }

    #[test]
    fn test_offline_shows_badge_then_enters_after_delay() {
        // Arrange
        let mut indicator = ConnectivityIndicator::default();

        // Act
        let reveal = ticket(indicator.on_offline());
        let before = indicator.view();
        indicator.on_timer(reveal.id);
        let after = indicator.view();

        // Assert
        assert_eq!(reveal.delay, Duration::from_millis(10));
        assert!(before.visible && !before.entered);
        assert_eq!(before.message, "Offline");
        assert!(after.entered);
        assert_eq!(indicator.state(), ConnectivityState::Appearing);
    }

    #[test]
    fn test_full_online_sequence_returns_to_hidden() {
        let mut indicator = ConnectivityIndicator::default();
        let reveal = ticket(indicator.on_offline());
        indicator.on_timer(reveal.id);

        let dwell = ticket(indicator.on_online());
        assert_eq!(indicator.state(), ConnectivityState::OnlineFlash);
        assert_eq!(indicator.view().message, "Back Online!");
        assert_eq!(dwell.delay, Duration::from_millis(1000));

        let fade = ticket(indicator.on_timer(dwell.id));
        assert_eq!(indicator.state(), ConnectivityState::Disappearing);
        assert!(indicator.view().leaving);
        assert_eq!(fade.delay, Duration::from_millis(500));

        indicator.on_timer(fade.id);
        assert_eq!(indicator.state(), ConnectivityState::Hidden);
        let view = indicator.view();
        assert!(!view.visible && !view.entered && !view.leaving);
        assert_eq!(indicator.pending_ticket(), None);
    }

    #[test]
    fn test_online_within_appearing_window_cancels_reveal() {
        let mut indicator = ConnectivityIndicator::default();
        let reveal = ticket(indicator.on_offline());

        let update = indicator.on_online();

        assert_eq!(update.cancel, Some(reveal.id));
        assert_eq!(indicator.state(), ConnectivityState::OnlineFlash);
        // The late reveal must not disturb the flash.
        assert_eq!(indicator.on_timer(reveal.id), IndicatorUpdate::default());
        assert_eq!(indicator.state(), ConnectivityState::OnlineFlash);
    }

    #[test]
    fn test_offline_during_fade_is_not_rehidden_by_stale_timer() {
        let mut indicator = ConnectivityIndicator::default();
        indicator.on_offline();
        let dwell = ticket(indicator.on_online());
        let fade = ticket(indicator.on_timer(dwell.id));

        let update = indicator.on_offline();

        assert_eq!(update.cancel, Some(fade.id));
        indicator.on_timer(fade.id);
        assert_eq!(indicator.state(), ConnectivityState::Appearing);
        assert!(indicator.view().visible);
    }

    #[test]
    fn test_repeated_offline_keeps_single_timer() {
        let mut indicator = ConnectivityIndicator::default();
        let first = ticket(indicator.on_offline());

        let again = indicator.on_offline();

        assert_eq!(again, IndicatorUpdate::default());
        assert_eq!(indicator.pending_ticket(), Some(first.id));
    }

    #[test]
    fn test_custom_timings_are_used() {
        let mut indicator = ConnectivityIndicator::new(IndicatorTimings {
            show_delay: Duration::from_millis(1),
            dwell: Duration::from_millis(2),
            fade: Duration::from_millis(3),
        });
        assert_eq!(ticket(indicator.on_offline()).delay, Duration::from_millis(1));
        assert_eq!(ticket(indicator.on_online()).delay, Duration::from_millis(2));
    }
}
