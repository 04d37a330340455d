/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};

use config::GameConfig;
use sim::event::{GameEvent, HurtCause};
use sim::level::{self, LEVEL_NAMES};
use sim::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// How the game loop ended.
enum Outcome {
    PodiumReached,
    Quit,
}

fn main() -> Result<()> {
    let config = GameConfig::load();
    init_logging(&config);

    let level = choose_level()?;
    let mut world = WorldState::new(&config);
    level::load_level(&mut world, level, &config)
        .with_context(|| format!("failed to load level {level}"))?;

    let mut renderer = Renderer::new();
    let enhanced_keys = match renderer.init() {
        Ok(flag) => flag,
        Err(e) => {
            let _ = renderer.cleanup();
            return Err(e).context("terminal init failed");
        }
    };

    let sound = SoundEngine::new(&config.audio);

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config, enhanced_keys);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result.context("game loop failed")? {
        Outcome::PodiumReached => {
            println!("----GAME OVER----");
            println!("YOUR SCORE: {}", world.score);
            println!("THANKS FOR PLAYING!!");
        }
        Outcome::Quit => {
            println!("Quit {} with {} points.", world.level_name, world.score);
        }
    }
    log::info!("exiting, score {}", world.score);
    Ok(())
}

/// Log to a file: the terminal is in raw mode while playing.
fn init_logging(config: &GameConfig) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    );
    match File::create(&config.log_file) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(e) => {
            eprintln!("Cannot open log file {}: {e}; logging disabled", config.log_file.display());
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
}

/// Level number from the first CLI argument, or from the prompt until a
/// valid answer is given.
fn choose_level() -> Result<u32> {
    if let Some(arg) = std::env::args().nth(1) {
        match level::parse_level_choice(&arg) {
            Some(n) => return Ok(n),
            None => eprintln!("'{arg}' is not a level number"),
        }
    }

    let menu = LEVEL_NAMES.iter()
        .enumerate()
        .map(|(i, name)| format!("{name}({})", i + 1))
        .collect::<Vec<_>>()
        .join(", ");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        println!("Choose a level! (Please enter a number)");
        print!("{menu}: ");
        io::stdout().flush().context("failed to write prompt")?;

        let Some(line) = lines.next() else { bail!("no level chosen") };
        let line = line.context("failed to read level choice")?;
        if let Some(n) = level::parse_level_choice(&line) {
            return Ok(n);
        }
        println!("Please enter 1-{}.", LEVEL_NAMES.len());
    }
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    enhanced_keys: bool,
) -> io::Result<Outcome> {
    let mut kb = InputState::new();
    kb.honor_release = enhanced_keys;
    let mut gp = GamepadState::new(&config.gamepad);
    if gp.connected {
        log::info!("gamepad detected");
    }
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.tick_rate_ms);

    // Jump presses between ticks are kept for the next tick.
    let mut pending_jump = false;

    loop {
        kb.drain_events();
        gp.update();

        if kb.quit_pressed() || gp.cancel_pressed() {
            log::info!("quit on tick {}", world.tick);
            return Ok(Outcome::Quit);
        }
        if kb.pause_pressed() || gp.confirm_pressed() {
            world.toggle_pause();
            log::debug!("phase {:?}", world.phase);
        }

        let mut input = kb.frame_input();
        gp.merge_into(&mut input);
        pending_jump |= input.jump;

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();

            if world.phase == Phase::Paused {
                world.tick_message();
                pending_jump = false;
            } else {
                input.jump = std::mem::take(&mut pending_jump);
                let events = step::step(world, &input);
                process_events(sound, &events);
            }

            if world.phase == Phase::Complete {
                renderer.render(world)?;
                return Ok(Outcome::PodiumReached);
            }
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }
}

/// Map step events to sounds and log lines.
fn process_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::Jumped => {
                if let Some(sfx) = sound { sfx.play_jump(); }
            }
            GameEvent::FlakeCollected { tier, points, x, y } => {
                log::debug!("collected {tier:?} flake at ({x}, {y}) for {points}");
                if let Some(sfx) = sound { sfx.play_collect(); }
            }
            GameEvent::PlayerHurt { cause } => {
                let what = match cause {
                    HurtCause::Enemy => "enemy contact",
                    HurtCause::Fell => "fall",
                };
                log::info!("player hurt by {what}");
                if let Some(sfx) = sound { sfx.play_hurt(); }
            }
            GameEvent::EnemyTurned { index, reason } => {
                log::trace!("enemy {index} turned: {reason:?}");
            }
            GameEvent::CameraReset => log::debug!("camera reset"),
            GameEvent::PodiumReached { bonus, final_score } => {
                log::info!("podium bonus {bonus}, final score {final_score}");
            }
        }
    }
}
