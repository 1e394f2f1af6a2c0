use std::path::Path;

use meridian_event::{EventLoop, LoopConfig};
use meridian_gamestate::Game;

pub fn run(dir: &Path) -> Result<(), String> {
    let data = super::load_dir(dir)?;
    let definitions = data.len();
    let files = data.sources().len();

    let game = Game::from_store(data, EventLoop::shared(LoopConfig::default()))
        .map_err(|e| e.to_string())?;
    let state = game.state();
    let state = state.read();
    let universe = game.universe();
    let terrain = universe.terrain();

    println!("  All checks passed for '{}'.", state.settings().name);
    println!("  {definitions} definitions in {files} files");
    println!(
        "  {} players, {} win conditions, {} entities on {}x{} {}",
        state.players().len(),
        state.conditions().len(),
        universe.world().len(),
        terrain.width(),
        terrain.height(),
        terrain.name()
    );

    Ok(())
}
