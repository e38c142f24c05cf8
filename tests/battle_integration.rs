//! Battle engine integration tests
//!
//! Drive the full stack end-to-end: bestiary spawns, roster staging,
//! initiative, the turn loop and the damage pipeline.

use std::rc::Rc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use warband::battle::{Battle, RollSource, Team};
use warband::bestiary::Bestiary;
use warband::core::EngineError;
use warband::creature::{Creature, CreatureRef, DamageType, HitPoints, Stats};

fn fighter(name: &str, hp: i32, dex: i32) -> CreatureRef {
    let mut creature = Creature::new(name);
    creature.hp = HitPoints::full(hp);
    creature.stats = Stats::new(10, dex, 10, 10, 10, 10);
    creature.into_ref()
}

#[test]
fn test_scripted_battle_with_manual_initiative() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut battle = Battle::new();

    let knight = fighter("knight", 10, 10); // init 20 + 0
    let wolf = fighter("wolf", 6, 14); // init 12 + 2
    let bandit = fighter("bandit", 8, 10); // init 7 + 0

    let mut heroes = Team::new("heroes");
    heroes.add(Rc::clone(&knight));
    let mut foes = Team::new("foes");
    foes.add(Rc::clone(&wolf));
    foes.add(Rc::clone(&bandit));

    battle.add_team(heroes, &mut rng);
    battle.add_team(foes, &mut rng);

    let entries: Vec<(CreatureRef, i32)> = vec![
        (Rc::clone(&knight), 20),
        (Rc::clone(&wolf), 12),
        (Rc::clone(&bandit), 7),
    ];
    battle.set_initiative(&entries, true, &mut rng).unwrap();

    let initiatives: Vec<i32> = battle.turn_order().iter().map(|e| e.initiative).collect();
    assert_eq!(initiatives, [20, 14, 7]);

    // round 1: knight cuts the wolf down, the wolf still gets skipped later
    let turn = battle.next_turn().unwrap().unwrap();
    assert_eq!((turn.round, turn.creature.borrow().name.as_str()), (1, "knight"));
    let report = wolf.borrow_mut().damage(6, DamageType::Slashing);
    assert!(report.dead);

    let turn = battle.next_turn().unwrap().unwrap();
    assert_eq!((turn.round, turn.creature.borrow().name.as_str()), (1, "bandit"));

    // round 2: the dead wolf is skipped without costing a turn
    let turn = battle.next_turn().unwrap().unwrap();
    assert_eq!((turn.round, turn.creature.borrow().name.as_str()), (2, "knight"));
    let turn = battle.next_turn().unwrap().unwrap();
    assert_eq!((turn.round, turn.creature.borrow().name.as_str()), (2, "bandit"));

    // everyone dies; the scheduler reports the battle over, bounded to one lap
    knight.borrow_mut().die();
    bandit.borrow_mut().die();
    assert!(battle.next_turn().unwrap().is_none());
    assert!(battle.next_turn().unwrap().is_none());
}

#[test]
fn test_next_turn_without_initiative_is_an_error() {
    let mut battle = Battle::new();
    assert!(matches!(battle.next_turn(), Err(EngineError::NoTurnOrder)));
}

#[test]
fn test_bestiary_teams_fight_to_a_finish() {
    let bestiary = Bestiary::standard();
    let mut rng = ChaCha8Rng::seed_from_u64(2026);

    let red: Vec<CreatureRef> = (0..2)
        .map(|n| {
            bestiary
                .spawn_named("skeleton", format!("skeleton {n}"), &mut rng)
                .unwrap()
                .into_ref()
        })
        .collect();
    let blue: Vec<CreatureRef> = (0..2)
        .map(|n| {
            bestiary
                .spawn_named("zombie", format!("zombie {n}"), &mut rng)
                .unwrap()
                .into_ref()
        })
        .collect();

    let mut battle = Battle::new();
    battle.add_team(
        Team::with_members("red", red.iter().map(Rc::clone).collect()),
        &mut rng,
    );
    battle.add_team(
        Team::with_members("blue", blue.iter().map(Rc::clone).collect()),
        &mut rng,
    );
    let entries = battle.initiative_list();
    battle.set_initiative(&entries, false, &mut rng).unwrap();

    let mut last_round = 0;
    let mut winner = None;
    for _ in 0..500 {
        let turn = battle.next_turn().unwrap().expect("both sides still have fighters");

        // the scheduler never hands out a dead creature's turn
        assert!(turn.creature.borrow().alive);
        // rounds only move forward
        assert!(turn.round >= last_round);
        last_round = turn.round;

        let on_red = red.iter().any(|h| Rc::ptr_eq(h, &turn.creature));
        let enemies = if on_red { &blue } else { &red };
        let Some(target) = enemies.iter().find(|h| h.borrow().alive) else {
            winner = Some(if on_red { "red" } else { "blue" });
            break;
        };
        target.borrow_mut().damage(4, DamageType::Slashing);
    }

    let winner = winner.expect("a 4-damage slog must end inside 500 turns");
    let losers = if winner == "red" { &blue } else { &red };
    assert!(losers.iter().all(|h| !h.borrow().alive));
    for handle in losers {
        assert_eq!(handle.borrow().hp.current(), 0);
    }
}

#[test]
fn test_mid_battle_reinforcements_join_the_rotation() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut battle = Battle::new();

    let a = fighter("a", 10, 10);
    let b = fighter("b", 10, 10);
    battle.add_creature(Rc::clone(&a), RollSource::Random, &mut rng);
    battle.add_creature(Rc::clone(&b), RollSource::Random, &mut rng);
    let entries: Vec<(CreatureRef, i32)> = vec![(Rc::clone(&a), 18), (Rc::clone(&b), 3)];
    battle.set_initiative(&entries, true, &mut rng).unwrap();

    // burn one turn, then a late arrival slots in between the two
    battle.next_turn().unwrap().unwrap();
    let late = fighter("late", 10, 10);
    battle.add_creature_mid_battle(Rc::clone(&late), RollSource::Supplied(10), &mut rng);

    let order: Vec<String> = battle
        .turn_order()
        .iter()
        .map(|e| e.creature.borrow().name.clone())
        .collect();
    assert_eq!(order, ["a", "late", "b"]);

    // the rotation picks the newcomer up within the next lap
    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(battle.next_turn().unwrap().unwrap().creature.borrow().name.clone());
    }
    assert!(seen.contains(&"late".to_string()));
}

#[test]
fn test_team_added_mid_battle_rolls_immediately() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let mut battle = Battle::new();
    let solo = fighter("solo", 10, 10);
    battle.add_creature(Rc::clone(&solo), RollSource::Random, &mut rng);
    let entries: Vec<(CreatureRef, i32)> = vec![(Rc::clone(&solo), 10)];
    battle.set_initiative(&entries, true, &mut rng).unwrap();

    let mut pack = Team::new("pack");
    pack.add(fighter("w1", 6, 14));
    pack.add(fighter("w2", 6, 14));
    battle.add_team(pack, &mut rng);

    assert_eq!(battle.turn_order().len(), 3);
    // descending order is restored after the joins
    let initiatives: Vec<i32> = battle.turn_order().iter().map(|e| e.initiative).collect();
    let mut expected = initiatives.clone();
    expected.sort_unstable_by(|x, y| y.cmp(x));
    assert_eq!(initiatives, expected);
}

#[test]
fn test_heal_mode_resistance_inside_a_battle() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut battle = Battle::new();

    let husk = fighter("husk", 20, 10);
    husk.borrow_mut().set_current(5);
    husk.borrow_mut()
        .set_resistance_named("necrotic", "heal", 0)
        .unwrap();
    battle.add_creature(Rc::clone(&husk), RollSource::Random, &mut rng);
    let entries: Vec<(CreatureRef, i32)> = vec![(Rc::clone(&husk), 10)];
    battle.set_initiative(&entries, true, &mut rng).unwrap();

    battle.next_turn().unwrap().unwrap();
    let report = husk.borrow_mut().damage(10, DamageType::Necrotic);
    assert!(report.healed_instead);
    assert_eq!(report.remaining_hp, 15);
    assert!(husk.borrow().alive);
}
