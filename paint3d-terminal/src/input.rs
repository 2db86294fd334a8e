/// Keyboard handling for the terminal host
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::debug;
use paint3d_core::AxisRates;

/// Requests the frame loop has to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    NextMode,
    NextAsset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    fn store(self, rates: &AxisRates, rate: f32) {
        match self {
            Axis::X => rates.set_x(rate),
            Axis::Y => rates.set_y(rate),
        }
    }
}

/// Turns rotate keys into angular rates.
///
/// Most terminals only report presses and auto-repeats, so a held key is
/// treated as released once `hold` passes without another event for it.
/// Terminals that do report releases stop the rotation straight away.
#[derive(Debug)]
pub struct Controls {
    rate: f32,
    hold: Duration,
    last_seen: [Option<Instant>; 2],
}

impl Controls {
    pub fn new(rate: f32, hold: Duration) -> Self {
        Self {
            rate,
            hold,
            last_seen: [None; 2],
        }
    }

    fn rotation(&self, code: KeyCode) -> Option<(Axis, f32)> {
        match code {
            KeyCode::Left | KeyCode::Char('a') => Some((Axis::Y, self.rate)),
            KeyCode::Right | KeyCode::Char('d') => Some((Axis::Y, -self.rate)),
            KeyCode::Up | KeyCode::Char('w') => Some((Axis::X, self.rate)),
            KeyCode::Down | KeyCode::Char('s') => Some((Axis::X, -self.rate)),
            _ => None,
        }
    }

    /// Applies `key` to `angular`, returning any command it maps to
    pub fn handle(&mut self, key: KeyEvent, now: Instant, angular: &AxisRates) -> Option<Command> {
        if key.kind == KeyEventKind::Release {
            if let Some((axis, _)) = self.rotation(key.code) {
                self.last_seen[axis.index()] = None;
                axis.store(angular, 0.0);
            }
            return None;
        }

        if let Some((axis, rate)) = self.rotation(key.code) {
            self.last_seen[axis.index()] = Some(now);
            axis.store(angular, rate);
            return None;
        }

        // Auto-repeat must not cycle through modes or assets
        if key.kind == KeyEventKind::Repeat {
            return None;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
            KeyCode::Char('m') | KeyCode::Char(' ') => Some(Command::NextMode),
            KeyCode::Char('n') | KeyCode::Tab => Some(Command::NextAsset),
            _ => None,
        }
    }

    /// Stops rotation on axes whose key has not been seen for `hold`
    pub fn expire(&mut self, now: Instant, angular: &AxisRates) {
        for axis in [Axis::X, Axis::Y] {
            let slot = &mut self.last_seen[axis.index()];
            if let Some(seen) = *slot {
                if now.saturating_duration_since(seen) > self.hold {
                    debug!("rotation about {:?} released", axis);
                    *slot = None;
                    axis.store(angular, 0.0);
                }
            }
        }
    }
}
