//! Buff Pong headless demo
//!
//! Plays a full seeded match between two tracking AIs and logs every event
//! with its sound cue. Run with `RUST_LOG=info` (or `debug` for effects).
//!
//! Usage: `buff-pong [tuning.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use buff_pong::CueTable;
    use buff_pong::Tuning;
    use buff_pong::sim::{FRAME_MS, GamePhase, GameState, Side, Skill, TickInput, tick, tracking_intent};

    /// Give up if nobody has won after this much game time
    const MAX_MATCH_MS: f64 = 30.0 * 60.0 * 1000.0;
    /// AI skill use, one press every N frames per player
    const SKILL_EVERY_FRAMES: u64 = 240;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json_or_default(&json),
            Err(e) => {
                log::warn!("Could not read {path} ({e}), using default tuning");
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        });

    log::info!("Buff Pong demo starting (seed {seed})");
    let cues = CueTable::new();
    let mut state = GameState::new(tuning, seed);
    state.initial_setup();

    let mut now = 0.0_f64;
    let mut frame: u64 = 0;
    while state.phase != GamePhase::MatchOver && now < MAX_MATCH_MS {
        let mut input = TickInput::default();
        for side in Side::BOTH {
            input = input.with_intent(side, tracking_intent(&state, side, 8.0));
            // Stagger the two players and alternate their skills
            let offset = side.index() as u64 * SKILL_EVERY_FRAMES / 2;
            if (frame + offset) % SKILL_EVERY_FRAMES == 0 {
                let skill = if (frame / SKILL_EVERY_FRAMES) % 2 == 0 {
                    Skill::One
                } else {
                    Skill::Two
                };
                input = input.with_skill(side, skill);
            }
        }

        now += FRAME_MS as f64;
        frame += 1;
        tick(&mut state, &input, now, FRAME_MS);

        for event in state.events.drain() {
            match cues.cue_for(&event) {
                Some(cue) => log::info!(
                    "[{:>8.0} ms] {} (cue {} @ {:.2})",
                    now,
                    event.kind().name(),
                    cue.key,
                    cue.volume
                ),
                None => log::debug!("[{:>8.0} ms] {}", now, event.kind().name()),
            }
        }
    }

    match state.winner {
        Some(winner) => println!(
            "{} wins after {:.1}s ({} - {} lives left)",
            winner.as_str(),
            now / 1000.0,
            state.lives(Side::Left),
            state.lives(Side::Right)
        ),
        None => println!("No winner after {:.0}s", now / 1000.0),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}
