//! Neon Breakout entry point
//!
//! On the web the page drives `WebGame` directly. Natively this runs a
//! headless attract-mode game, records the result and prints the board.
//!
//! Usage: `neon-breakout [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::RefCell;
    use std::error::Error;
    use std::rc::Rc;

    use neon_breakout::audio::LogAudioSink;
    use neon_breakout::autopilot::Autopilot;
    use neon_breakout::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
    use neon_breakout::game::{Collaborators, Game, fetch_scores};
    use neon_breakout::highscores::StoredLeaderboard;
    use neon_breakout::platform::clock_seed;
    use neon_breakout::renderer::{Frame, RenderSink};
    use neon_breakout::sim::Playfield;
    use neon_breakout::{Settings, Tuning};

    const SETTINGS_PATH: &str = "neon-breakout-settings.json";
    const SCORES_PATH: &str = "neon-breakout-scores.json";
    /// Simulated display rate
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Five minutes of play at most
    const MAX_FRAMES: u64 = 60 * 60 * 5;

    /// Counts frames and remembers the last HUD line
    #[derive(Default)]
    struct HeadlessSink {
        stats: Rc<RefCell<(u64, String)>>,
    }

    impl RenderSink for HeadlessSink {
        fn present(&mut self, frame: &Frame) {
            let mut stats = self.stats.borrow_mut();
            stats.0 += 1;
            stats.1 = format!(
                "level {} cycle {} | score {} | lives {} | {} bricks, {} balls",
                frame.hud.level,
                frame.hud.loops,
                frame.hud.score,
                frame.hud.lives,
                frame.bricks.len(),
                frame.balls.len()
            );
        }
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let tuning = match std::env::args().nth(1) {
            Some(path) => {
                log::info!("Loading tuning from {}", path);
                Tuning::load(path)?
            }
            None => Tuning::default(),
        };
        let settings = Settings::load_from(SETTINGS_PATH)?;

        let sink = HeadlessSink::default();
        let stats = Rc::clone(&sink.stats);
        let seed = clock_seed();

        let mut game = Game::start(
            tuning,
            Playfield::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT),
            seed,
            settings.clone(),
            Collaborators::new(
                Box::new(Autopilot::new()),
                Box::new(LogAudioSink::new(&settings)),
                Box::new(sink),
            ),
            0.0,
        )?;

        let mut now = 0.0;
        for _ in 0..MAX_FRAMES {
            now += FRAME_MS;
            game.frame(now);
            if game.is_over() {
                break;
            }
        }
        let score = game.stop();

        let (frames, hud) = stats.borrow().clone();
        println!("Attract run (seed {}) ended after {} frames", seed, frames);
        println!("  {}", hud);
        println!("  final score: {}", score);

        let mut board = StoredLeaderboard::open(SCORES_PATH)?;
        if board.scores().qualifies(score) {
            game.submit_score(&mut board, "CPU");
        }

        println!("\nLeaderboard");
        for (rank, entry) in fetch_scores(&board).iter().enumerate() {
            println!("  {}. {} {:>7}", rank + 1, entry.initials, entry.score);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Neon Breakout (native, headless) starting...");

    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm entry point is `platform::web::init`; the page drives `WebGame`
}
