//! Autoplay driver
//!
//! A periodic timer that advances to the next tab. Each tick is an ordinary
//! token-protected activation.

use crate::host::{Host, Wake};
use crate::instance::Instance;

impl Instance {
    /// (Re)arm the interval. Does nothing without a positive delay, while
    /// disabled or in accordion mode.
    pub fn start_autoplay<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.stop_autoplay(host);
        if !self.enabled || self.accordion {
            return;
        }
        if let Some(period) = self.options.autoplay_interval() {
            self.autoplay = Some(host.set_interval(period, Wake::autoplay(self.id)));
            tracing::debug!("{}: autoplay every {}ms", self.id, period);
        }
    }

    pub fn stop_autoplay<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let Some(timer) = self.autoplay.take() {
            host.clear_timer(timer);
        }
    }

    pub(crate) fn autoplay_tick<H: Host + ?Sized>(&mut self, host: &mut H) {
        if !self.enabled || self.accordion {
            self.stop_autoplay(host);
            return;
        }
        self.next(host);
    }

    /// Push the next tick a full period away after user input
    pub(crate) fn restart_autoplay<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.autoplay.is_some() {
            self.start_autoplay(host);
        }
    }
}
