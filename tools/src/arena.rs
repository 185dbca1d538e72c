//! Arena: the demo simulation driven by sim-runner.
//!
//! Every peer that has sent input owns a player. WASD moves it, holding
//! the left mouse button dashes, and a small seeded drift keeps replays
//! honest: any rollback that recomputed a tick differently would show up
//! as diverging positions.

use rollback_core::{
    interp::lerp_point, rng::RngBank, DeviceState, PeerId, RenderContext, Simulation, Tick,
    UpdateContext,
};
use serde::Serialize;
use std::collections::BTreeMap;

pub const ARENA_HALF_EXTENT: f32 = 200.0;
const WALK_SPEED: f32 = 120.0;
const DASH_MULTIPLIER: f32 = 2.5;
const DRIFT: f32 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub pos:    [f32; 2],
    pub dashes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arena {
    #[serde(skip)]
    bank:        RngBank,
    pub ticks:   u64,
    pub players: BTreeMap<PeerId, Player>,
}

impl Arena {
    pub fn new(seed: u64) -> Self {
        Self { bank: RngBank::new(seed), ticks: 0, players: BTreeMap::new() }
    }

    fn spawn(&self, peer: PeerId, tick: Tick) -> Player {
        let mut rng = self.bank.for_peer_at_tick(peer, tick);
        Player {
            pos: [
                rng.range_f32(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT),
                rng.range_f32(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT),
            ],
            dashes: 0,
        }
    }
}

impl Simulation for Arena {
    type Device = DeviceState;
    type View = ArenaView;

    fn update(&mut self, ctx: &UpdateContext<'_, DeviceState>) {
        self.ticks += 1;

        for (&peer, input) in &ctx.inputs {
            if !self.players.contains_key(&peer) {
                let player = self.spawn(peer, ctx.tick);
                self.players.insert(peer, player);
            }

            let mut rng = self.bank.for_peer_at_tick(peer, ctx.tick);
            let (dx, dy) = input.device.keyboard.axis();
            let dashing = input.device.mouse.left;
            let speed = WALK_SPEED * ctx.dt() * if dashing { DASH_MULTIPLIER } else { 1.0 };

            if let Some(player) = self.players.get_mut(&peer) {
                player.pos[0] = (player.pos[0] + dx * speed + rng.range_f32(-DRIFT, DRIFT))
                    .clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT);
                player.pos[1] = (player.pos[1] + dy * speed + rng.range_f32(-DRIFT, DRIFT))
                    .clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT);
                if dashing {
                    player.dashes += 1;
                }
            }
        }
    }

    fn render(ctx: &RenderContext<'_, Self>) -> ArenaView {
        let players = ctx
            .current
            .players
            .iter()
            .map(|(peer, current)| {
                let previous = ctx.previous.players.get(peer).unwrap_or(current);
                PlayerView {
                    peer:  *peer,
                    pos:   lerp_point(previous.pos, current.pos, ctx.alpha),
                    local: *peer == ctx.peer,
                }
            })
            .collect();

        ArenaView {
            players,
            debug_ticks: ctx.debug.then_some(ctx.current.ticks),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub peer:  PeerId,
    pub pos:   [f32; 2],
    pub local: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArenaView {
    pub players:     Vec<PlayerView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_ticks: Option<u64>,
}
