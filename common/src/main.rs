use autosweeper::{Config, GameError, GameState, Session};

fn main() -> anyhow::Result<()> {
    // --- 1. Configuration ---
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    println!("--- Autonomous Minesweeper ---");
    println!(
        "{} x {}, {} mines, {} session(s), logs in {}",
        config.width,
        config.height,
        config.mines,
        config.sessions,
        config.output_dir.display()
    );

    // --- 2. Session loop ---
    let mut won = 0usize;
    for round in 1..=config.sessions {
        let mut session = Session::new(config.clone());
        match session.run() {
            Ok(GameState::Won) => {
                won += 1;
                println!("session {round}: win");
            }
            Ok(GameState::Lost) => println!("session {round}: loss"),
            Ok(GameState::Playing) => println!("session {round}: ended unexpectedly"),
            // A contradiction ends one session, not the whole run. Its log
            // artifact has already been flushed.
            Err(error) => match error.downcast_ref::<GameError>() {
                Some(GameError::Contradiction { .. }) => {
                    println!("session {round}: {error}");
                }
                _ => return Err(error),
            },
        }
    }

    // --- 3. Tally ---
    println!("{won} / {} won", config.sessions);
    Ok(())
}
