//! Grid Challenge entry point
//!
//! The browser build is driven from `platform::web`. Natively there is no
//! renderer, so the binary plays a seeded session in idle mode and logs the
//! result.
//!
//! Usage: `grid-challenge [seed] [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use grid_challenge::consts::SIM_DT_MS;
    use grid_challenge::sim::{GamePhase, SessionState, TickInput, tick};
    use grid_challenge::{SessionSummary, Settings};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Grid Challenge (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            log::error!("Invalid seed: {e}");
            std::process::exit(2);
        }
        None => rand::random(),
    };
    let settings = match args.next() {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(2);
            }
        },
        None => Settings::default(),
    };

    let mut state = SessionState::new(seed, settings);
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    while state.phase != GamePhase::Complete {
        tick(&mut state, &input, SIM_DT_MS);
    }

    let summary = SessionSummary::from_state(&state);
    println!("Seed: {seed}");
    println!(
        "Final score: {} / {}",
        summary.final_score, state.max_possible_score
    );
    println!(
        "Levels completed: {}/{}",
        summary.levels_completed, summary.level_count
    );
    println!(
        "Accuracy: {:.1}% (grade {})",
        summary.accuracy_percent,
        summary.grade.as_str()
    );
    println!("Time remaining: {}", summary.time_remaining_label());
    for line in &summary.levels {
        println!(
            "  Level {}: {}/{} ({:.0}%), {:+} points, {:.1}s",
            line.level,
            line.correct_answers,
            line.total_answers,
            line.accuracy_percent,
            line.score,
            line.time_spent_secs
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_start, this is just to satisfy the compiler
}
