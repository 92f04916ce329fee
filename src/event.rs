use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, KeyEvent, KeyEventKind, MouseEvent};

pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Tick,
}

/// Polls the terminal on the calling thread. Nothing reads input between
/// calls, so a child process can own the terminal while we wait on it.
pub struct EventHandler {
    tick_rate: Duration,
    next_tick: Instant,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self {
            tick_rate,
            next_tick: Instant::now() + tick_rate,
        }
    }

    /// Blocks until an input event arrives or the next tick is due.
    pub fn next(&mut self) -> io::Result<Event> {
        loop {
            let timeout = self.next_tick.saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                match event::read()? {
                    event::Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(Event::Key(key)),
                    event::Event::Mouse(mouse) => return Ok(Event::Mouse(mouse)),
                    _ => continue,
                }
            }
            let now = Instant::now();
            if now >= self.next_tick {
                self.next_tick += self.tick_rate;
                // Fell behind: skip ticks instead of bursting.
                if self.next_tick < now {
                    self.next_tick = now + self.tick_rate;
                }
                return Ok(Event::Tick);
            }
        }
    }

    /// Restarts tick timing, e.g. after the terminal was handed to a child.
    pub fn resync(&mut self) {
        self.next_tick = Instant::now() + self.tick_rate;
    }
}
