//! sim-runner: headless rollback session runner.
//!
//! Drives the Arena demo through the rollback core the way a game host
//! would: one frame at a time, capturing local input on tick boundaries,
//! while a scripted remote peer's input arrives `--latency` ticks late.
//! The same session is then replayed with every input on time, and the
//! two final states must match.
//!
//! Usage:
//!   sim-runner --ticks 600 --tick-rate 60 --latency 4 --fps 144
//!   sim-runner --config session.json --json

mod arena;

use anyhow::{anyhow, Result};
use arena::{Arena, ArenaView};
use chrono::Duration;
use rollback_core::{
    DeviceState, FrameDriver, History, HistoryStats, Input, KeyboardState, MouseState, PeerId,
    SessionConfig, Tick, TickClock, WallClockTime,
};
use std::collections::VecDeque;
use std::env;

const REMOTE_PEER: PeerId = PeerId::from_u128(0x5EED_BEEF);

#[derive(Debug, Clone, Copy)]
struct RunOptions {
    ticks:   Tick,
    latency: Tick,
    fps:     u32,
}

#[derive(serde::Serialize)]
struct SessionReport {
    final_tick: Tick,
    frames:     u64,
    stats:      HistoryStats,
    #[serde(skip)]
    state:      Arena,
    last_view:  Option<ArenaView>,
}

#[derive(serde::Serialize)]
struct RunSummary<'a> {
    seed:       u64,
    tick_rate:  u32,
    window:     usize,
    ticks:      Tick,
    latency:    Tick,
    converged:  bool,
    final_state: &'a Arena,
    late:       &'a SessionReport,
    on_time:    &'a SessionReport,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = match args.windows(2).find(|w| w[0] == "--config") {
        Some(w) => SessionConfig::load(&w[1])?,
        None => SessionConfig::default(),
    };
    config.tick_rate = parse_arg(&args, "--tick-rate", config.tick_rate);
    config.window = parse_arg(&args, "--window", config.window);
    config.seed = parse_arg(&args, "--seed", config.seed);
    config.validate()?;

    let options = RunOptions {
        ticks:   parse_arg(&args, "--ticks", 600),
        latency: parse_arg(&args, "--latency", 4),
        fps:     parse_arg(&args, "--fps", 144u32).max(1),
    };
    let json = args.iter().any(|a| a == "--json");

    if options.latency < 0 {
        return Err(anyhow!("--latency must not be negative"));
    }
    if options.latency as usize >= config.window {
        log::warn!(
            "Latency of {} ticks exceeds the {}-tick rollback window; late input will be ignored",
            options.latency,
            config.window
        );
    }

    if !json {
        println!("Rollback core — sim-runner");
        println!("  seed:      {}", config.seed);
        println!("  tick rate: {}", config.tick_rate);
        println!("  window:    {}", config.window);
        println!("  ticks:     {}", options.ticks);
        println!("  latency:   {}", options.latency);
        println!("  fps:       {}", options.fps);
        println!();
    }

    let clock = config.clock(chrono::Utc::now())?;
    let late = run_session(&config, clock, options)?;
    let on_time = run_session(&config, clock, RunOptions { latency: 0, ..options })?;
    let converged = late.state == on_time.state;

    if json {
        let summary = RunSummary {
            seed:        config.seed,
            tick_rate:   config.tick_rate,
            window:      config.window,
            ticks:       options.ticks,
            latency:     options.latency,
            converged,
            final_state: &late.state,
            late:        &late,
            on_time:     &on_time,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&late, &on_time, converged);
    }

    if !converged {
        return Err(anyhow!("late and on-time sessions diverged at tick {}", options.ticks));
    }
    Ok(())
}

/// Play one session frame by frame and return its final state.
fn run_session(config: &SessionConfig, clock: TickClock, options: RunOptions) -> Result<SessionReport> {
    let mut history = History::new(clock, config.window, Arena::new(config.seed))?;
    let mut driver = FrameDriver::new(PeerId::local());
    let mut local_source = move |now: WallClockTime| local_device(clock.time_to_tick(now).0);

    // Remote input for tick k, stamped inside tick k, delivered at tick k + latency.
    let mut in_flight: VecDeque<(WallClockTime, Input<DeviceState>)> = (0..options.ticks)
        .map(|tick| {
            let stamped = clock.tick_start(tick) + Duration::milliseconds(1);
            let delivered = clock.tick_start(tick + options.latency) + Duration::milliseconds(1);
            (delivered, Input::new(stamped, remote_device(tick)))
        })
        .collect();

    let end = clock.tick_start(options.ticks);
    let frame_nanos = 1_000_000_000 / i64::from(options.fps);
    let mut frames: u64 = 0;
    let mut last_view = None;

    loop {
        let now = clock.origin() + Duration::nanoseconds(frame_nanos * frames as i64);
        if now >= end {
            break;
        }

        while in_flight.front().is_some_and(|(delivered, _)| *delivered <= now) {
            if let Some((_, input)) = in_flight.pop_front() {
                history.add_input(REMOTE_PEER, input);
            }
        }

        let frame = driver
            .frame(&mut history, &mut local_source, now)
            .ok_or_else(|| anyhow!("tick for frame {frames} fell out of the rollback window"))?;

        if frame.captured && frame.tick % i64::from(config.tick_rate) == 0 {
            let view = frame.render(driver.peer(), true);
            log::debug!("tick {}: {}", frame.tick, serde_json::to_string(&view)?);
            last_view = Some(view);
        }
        frames += 1;
    }

    for (_, input) in in_flight.drain(..) {
        history.add_input(REMOTE_PEER, input);
    }

    let state = history.try_state(options.ticks)?;
    log::info!(
        "Session finished: {frames} frames, {} rollbacks, {} ticks simulated",
        history.stats().rollbacks,
        history.stats().ticks_simulated
    );

    Ok(SessionReport {
        final_tick: options.ticks,
        frames,
        stats: history.stats(),
        state,
        last_view,
    })
}

/// Local player: walks a square, one side every 90 ticks, dashing now and then.
fn local_device(tick: Tick) -> DeviceState {
    let side = tick.div_euclid(90).rem_euclid(4);
    DeviceState {
        mouse: MouseState { left: tick.rem_euclid(45) < 5, ..Default::default() },
        keyboard: KeyboardState { d: side == 0, s: side == 1, a: side == 2, w: side == 3 },
    }
}

/// Remote player: zig-zags, changing direction every 25 ticks.
fn remote_device(tick: Tick) -> DeviceState {
    let leg = tick.div_euclid(25).rem_euclid(2);
    DeviceState {
        mouse: MouseState::default(),
        keyboard: KeyboardState { w: leg == 0, s: leg == 1, d: true, a: false },
    }
}

fn print_summary(late: &SessionReport, on_time: &SessionReport, converged: bool) {
    println!("=== RUN SUMMARY ===");
    println!("  final tick:        {}", late.final_tick);
    println!("  frames:            {}", late.frames);
    println!("  players:           {}", late.state.players.len());
    for (peer, player) in &late.state.players {
        println!(
            "    {peer}: pos ({:.2}, {:.2}) dashes {}",
            player.pos[0], player.pos[1], player.dashes
        );
    }

    println!();
    println!("=== ROLLBACK ===");
    for (label, report) in [("late", late), ("on time", on_time)] {
        let s = report.stats;
        println!(
            "  {label:<8} inputs {:>6}  rollbacks {:>5}  discarded {:>6}  simulated {:>6}  hits {:>6}",
            s.inputs_received, s.rollbacks, s.checkpoints_discarded, s.ticks_simulated, s.cache_hits
        );
    }
    println!();
    println!("  converged:         {}", if converged { "yes" } else { "NO" });
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
