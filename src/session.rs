//! Frame loop driver
//!
//! Owns the game state and wires one platform and one canvas to it. Each
//! frame renders, polls input, steps the simulation once and then waits out
//! the rest of the frame.

use std::io;

use crate::config::Config;
use crate::platform::{Key, Platform};
use crate::renderer::{self, Canvas};
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

/// A running game
pub struct Session {
    state: GameState,
    last_phase: GamePhase,
    quit: bool,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let state = GameState::new(config);
        Self {
            last_phase: state.phase,
            state,
            quit: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Quit requested or every level cleared
    pub fn is_over(&self) -> bool {
        self.quit || self.state.finished
    }

    /// Run one frame; returns what happened in the simulation
    pub fn frame<P: Platform, C: Canvas>(
        &mut self,
        platform: &mut P,
        canvas: &mut C,
    ) -> io::Result<Vec<GameEvent>> {
        let now = platform.now();
        renderer::draw_frame(canvas, &self.state, now)?;

        let events = platform.poll_events()?;
        if events.quit {
            log::info!("Quit requested");
            self.quit = true;
            return Ok(Vec::new());
        }

        let keys = platform.key_state();
        let input = TickInput {
            left: keys.left,
            right: keys.right,
            fire: events.pressed(Key::Fire),
        };

        let game_events = tick(&mut self.state, &input, now);

        if self.state.phase != self.last_phase {
            log::debug!("Phase {:?} -> {:?}", self.last_phase, self.state.phase);
            self.last_phase = self.state.phase;
        }

        platform.tick(self.state.config().target_fps);
        Ok(game_events)
    }

    /// Run frames until the session is over
    pub fn run<P: Platform, C: Canvas>(&mut self, platform: &mut P, canvas: &mut C) -> io::Result<()> {
        while !self.is_over() {
            self.frame(platform, canvas)?;
        }
        log::info!(
            "Session over at level {} with score {}",
            self.state.level_index + 1,
            self.state.score
        );
        Ok(())
    }
}
