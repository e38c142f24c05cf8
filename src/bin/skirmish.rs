//! Scripted skirmish between two bestiary teams
//!
//! Spawns both sides from the standard bestiary, rolls initiative and lets
//! the turn loop run until one side is wiped out. Run with RUST_LOG=info
//! (or default) to watch the turn-by-turn log; pass --seed to replay a
//! battle exactly.

use std::rc::Rc;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use warband::battle::{Battle, Team};
use warband::bestiary::Bestiary;
use warband::core::Result;
use warband::creature::{Ability, CreatureRef, DamageType};
use warband::dice::EntropySource;

#[derive(Parser)]
#[command(about = "Run a scripted skirmish between two bestiary teams")]
struct Args {
    /// RNG seed; omit for a different battle every run
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many turns even if both sides still stand
    #[arg(long, default_value_t = 100)]
    turns: u32,

    /// Archetypes on the red team (repeatable)
    #[arg(long = "red", value_name = "ARCHETYPE")]
    red: Vec<String>,

    /// Archetypes on the blue team (repeatable)
    #[arg(long = "blue", value_name = "ARCHETYPE")]
    blue: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let bestiary = Bestiary::standard();
    let red_specs = or_default(args.red, "skeleton");
    let blue_specs = or_default(args.blue, "zombie");

    let (red, red_handles) = build_team("red", &red_specs, &bestiary, &mut rng)?;
    let (blue, blue_handles) = build_team("blue", &blue_specs, &bestiary, &mut rng)?;

    let mut battle = Battle::new();
    battle.add_team(red, &mut rng);
    battle.add_team(blue, &mut rng);
    let entries = battle.initiative_list();
    battle.set_initiative(&entries, false, &mut rng)?;

    for entry in battle.turn_order() {
        let creature = entry.creature.borrow();
        tracing::info!(name = %creature.name, initiative = entry.initiative, hp = %creature.hp, "ready");
    }

    for _ in 0..args.turns {
        let Some(turn) = battle.next_turn()? else {
            tracing::info!("nobody left standing");
            break;
        };

        let on_red = red_handles.iter().any(|h| Rc::ptr_eq(h, &turn.creature));
        let enemies = if on_red { &blue_handles } else { &red_handles };
        let Some(target) = enemies.iter().find(|h| h.borrow().alive) else {
            tracing::info!(
                winner = if on_red { "red" } else { "blue" },
                round = turn.round,
                "battle won"
            );
            break;
        };

        let (attacker, strength_mod) = {
            let creature = turn.creature.borrow();
            (creature.name.clone(), creature.modifier(Ability::Str))
        };
        let amount = rng.uniform_int(1, 6) + strength_mod;
        let report = target.borrow_mut().damage(amount, DamageType::Bludgeoning);
        tracing::info!(
            round = turn.round,
            attacker = %attacker,
            target = %report.target,
            dealt = report.final_amount,
            remaining_hp = report.remaining_hp,
            dead = report.dead,
            "strike"
        );
    }

    Ok(())
}

fn or_default(specs: Vec<String>, fallback: &str) -> Vec<String> {
    if specs.is_empty() {
        vec![fallback.to_string(); 2]
    } else {
        specs
    }
}

fn build_team(
    name: &str,
    specs: &[String],
    bestiary: &Bestiary,
    rng: &mut dyn EntropySource,
) -> Result<(Team, Vec<CreatureRef>)> {
    let mut team = Team::new(name);
    let mut handles = Vec::new();
    for (n, key) in specs.iter().enumerate() {
        let creature = bestiary
            .spawn_named(key, format!("{name} {key} {}", n + 1), rng)?
            .into_ref();
        handles.push(Rc::clone(&creature));
        team.add(creature);
    }
    Ok((team, handles))
}
