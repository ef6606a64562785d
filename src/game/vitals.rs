//! Mirrored combat vitals. Values are whatever the authority last sent.

use crate::render::{HudSink, Side};

pub const INITIAL_HEALTH: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameVitals {
    pub health: i64,
    pub opponent_health: i64,
    pub power: i64,
    pub opponent_power: i64,
    pub combo: i64,
}

impl Default for GameVitals {
    fn default() -> Self {
        Self {
            health: INITIAL_HEALTH,
            opponent_health: INITIAL_HEALTH,
            power: 0,
            opponent_power: 0,
            combo: 0,
        }
    }
}

impl GameVitals {
    pub fn set_health(&mut self, side: Side, value: i64, hud: &mut dyn HudSink) {
        match side {
            Side::Local => self.health = value,
            Side::Opponent => self.opponent_health = value,
        }
        hud.set_health(side, value);
    }

    pub fn set_power(&mut self, side: Side, value: i64, hud: &mut dyn HudSink) {
        match side {
            Side::Local => self.power = value,
            Side::Opponent => self.opponent_power = value,
        }
        hud.set_power(side, value);
    }

    pub fn set_combo(&mut self, value: i64, hud: &mut dyn HudSink) {
        self.combo = value;
        hud.set_combo(value);
    }

    /// Push every value to the HUD
    pub fn publish(&self, hud: &mut dyn HudSink) {
        hud.set_health(Side::Local, self.health);
        hud.set_health(Side::Opponent, self.opponent_health);
        hud.set_power(Side::Local, self.power);
        hud.set_power(Side::Opponent, self.opponent_power);
        hud.set_combo(self.combo);
    }
}
