use std::path::Path;
use std::rc::Rc;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use meridian_event::{EventLoop, LoopConfig, SimTime};
use meridian_gamestate::{Game, GameState, PlayerStatus, RenderAttachment, RenderFactory};

use crate::render::TextRenderer;

pub fn run(dir: &Path, until: u64, render: bool, verbose: bool) -> Result<(), String> {
    let data = super::load_dir(dir)?;

    let mut config = LoopConfig::default();
    if let Some(max_log) = data.settings().and_then(|s| s.max_log) {
        config = config.with_max_log(max_log);
    }
    let event_loop = EventLoop::shared(config);
    let mut game = Game::from_store(data, Rc::clone(&event_loop)).map_err(|e| e.to_string())?;

    let renderer = Rc::new(TextRenderer::new());
    if render {
        let factory: Rc<dyn RenderFactory> = renderer.clone();
        game.attach_renderer(RenderAttachment::factory(factory));
    }

    let dispatched = event_loop
        .borrow_mut()
        .reach(SimTime(until))
        .map_err(|e| format!("simulation error: {e}"))?;

    let state = game.state();
    let state = state.read();

    // Header
    println!(
        "  {} '{}' {}",
        "Simulation".bold(),
        state.settings().name,
        format!("(until t={until}, seed={})", state.settings().seed).dimmed()
    );
    println!(
        "  {dispatched} events dispatched, {} updates",
        state.updates()
    );
    match state.outcome() {
        Some(outcome) => {
            let winners: Vec<&str> = outcome
                .winners
                .iter()
                .filter_map(|id| state.player(*id).map(|p| p.name.as_str()))
                .collect();
            let winners = if winners.is_empty() {
                "nobody".to_string()
            } else {
                winners.join(", ")
            };
            println!(
                "  {} '{}' met at {}: {} won",
                "Outcome".green().bold(),
                outcome.condition,
                outcome.time,
                winners
            );
        }
        None => println!("  {} no win condition met yet", "Running".yellow().bold()),
    }
    println!();

    if verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        let lp = event_loop.borrow();
        let events = lp.log().events_for(game.target());
        for event in &events {
            let time = format!("[{}]", event.time).dimmed();
            let payload = event.payload.as_deref().unwrap_or("");
            println!("  {time} {} {} {payload}", event.target, event.kind.cyan());
        }
        if events.is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    }

    print_players(&state);
    print_entities(&game, render.then_some(&*renderer));

    Ok(())
}

fn print_players(state: &GameState) {
    if state.players().is_empty() {
        return;
    }
    println!("  {}", "Players".bold().underline());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Player", "Team", "Status", "Live units"]);
    for player in state.players() {
        let status = match player.status {
            PlayerStatus::Playing => player.status.to_string().normal(),
            PlayerStatus::Won => player.status.to_string().green().bold(),
            PlayerStatus::Lost => player.status.to_string().red(),
        };
        table.add_row(vec![
            player.name.clone(),
            player.team.map(|t| t.to_string()).unwrap_or_else(|| "--".into()),
            status.to_string(),
            player.live_units.to_string(),
        ]);
    }
    println!("{table}");
    println!();
}

fn print_entities(game: &Game, renderer: Option<&TextRenderer>) {
    let universe = game.universe();
    let state = game.state();
    let state = state.read();

    println!("  {}", "Entities".bold().underline());
    println!();
    if universe.world().is_empty() {
        println!("  {}", "(none alive)".dimmed());
        println!();
        return;
    }

    let frames = renderer.map(TextRenderer::frames).unwrap_or_default();
    let mut header = vec!["Id", "Unit", "Owner", "Position", "HP", "Expires"];
    if renderer.is_some() {
        header.push("Frames");
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    for entity in universe.world().iter() {
        let s = entity.state();
        let owner = s
            .owner
            .and_then(|id| state.player(id))
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "neutral".into());
        let mut row = vec![
            s.id.to_string(),
            s.definition.clone(),
            owner,
            s.position.to_string(),
            s.hit_points.to_string(),
            s.expires_at
                .map(|t| t.to_string())
                .unwrap_or_else(|| "--".into()),
        ];
        if renderer.is_some() {
            row.push(
                frames
                    .get(&s.id)
                    .map(|f| format!("{} at {}", f.frames, f.position))
                    .unwrap_or_else(|| "0".into()),
            );
        }
        table.add_row(row);
    }
    println!("{table}");
    println!();
    println!(
        "  {} entities on {}",
        universe.world().len(),
        universe.terrain().name()
    );
}
