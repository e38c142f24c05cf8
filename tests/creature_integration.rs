//! Creature and persistence integration tests
//!
//! Round-trip rosters through the JSON wire format and check that shared
//! handles keep team views and battle mutations in sync.

use std::rc::Rc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use warband::battle::Team;
use warband::bestiary::Bestiary;
use warband::creature::{
    Ability, Creature, DamageType, HitPoints, ResistMode, Stats,
};

fn sample_team() -> Team {
    let mut karg = Creature::new("Karg");
    karg.hp = HitPoints::new(30, 22, 35, 4);
    karg.stats = Stats::new(18, 12, 16, 8, 10, 9);
    karg.set_resistance(DamageType::Fire, ResistMode::Resistant, 2);
    karg.set_resistance(DamageType::Poison, ResistMode::Immune, 0);

    let mut wisp = Creature::new("Wisp");
    wisp.hp = HitPoints::new(12, 12, 0, 0);
    wisp.set_resistance(DamageType::Radiant, ResistMode::Heal, 1);
    wisp.set_resistance(DamageType::Necrotic, ResistMode::Vulnerable, -1);
    wisp.die();

    Team::with_members("gravediggers", vec![karg.into_ref(), wisp.into_ref()])
}

#[test]
fn test_team_json_round_trip_is_exact() {
    let team = sample_team();
    let json = serde_json::to_string_pretty(&team).unwrap();
    let back: Team = serde_json::from_str(&json).unwrap();

    assert_eq!(back.name, team.name);
    assert_eq!(back.len(), team.len());

    for (original, restored) in team.iter().zip(back.iter()) {
        let original = original.borrow();
        let restored = restored.borrow();
        assert_eq!(restored.name, original.name);
        assert_eq!(restored.alive, original.alive);
        assert_eq!(restored.hp, original.hp);
        assert_eq!(restored.stats, original.stats);
        // every one of the 27 resistance entries survives exactly
        for damage_type in DamageType::ALL {
            assert_eq!(
                restored.resistance(damage_type),
                original.resistance(damage_type),
                "resistance mismatch for {damage_type}"
            );
        }
    }
}

#[test]
fn test_team_wire_format_keys() {
    let team = sample_team();
    let json = serde_json::to_value(&team).unwrap();

    assert_eq!(json["team_name"], "gravediggers");
    let record = &json["teammates"][0];
    assert_eq!(record["name"], "Karg");
    assert_eq!(record["alive"], true);
    assert_eq!(record["hp"]["max_hp"], 30);
    assert_eq!(record["hp"]["real_hp"], 22);
    assert_eq!(record["hp"]["temp_hp"], 35);
    assert_eq!(record["hp"]["shield"], 4);
    assert_eq!(record["stats"]["STR"], 18);
    assert_eq!(record["resistances"].as_object().unwrap().len(), 27);
    assert_eq!(record["resistances"]["fire"]["mode"], "resistant");
    assert_eq!(record["resistances"]["fire"]["flat_modifier"], 2);

    // a dead member round-trips as dead
    assert_eq!(json["teammates"][1]["alive"], false);
}

#[test]
fn test_team_file_save_and_load() {
    let team = sample_team();
    let path = std::env::temp_dir().join(format!("warband-team-{}.json", std::process::id()));

    team.save(&path).unwrap();
    let loaded = Team::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.name, team.name);
    assert_eq!(loaded.len(), 2);
    assert!(!loaded.iter().nth(1).unwrap().borrow().alive);
}

#[test]
fn test_creature_file_save_and_load() {
    let mut creature = Creature::new("lone wanderer");
    creature.hp = HitPoints::new(25, 25, 0, 3);
    creature.stats.set(Ability::Con, 17);
    let path =
        std::env::temp_dir().join(format!("warband-creature-{}.json", std::process::id()));

    creature.save(&path).unwrap();
    let loaded = Creature::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.name, creature.name);
    assert_eq!(loaded.hp, creature.hp);
    assert_eq!(loaded.stat(Ability::Con), 17);
}

#[test]
fn test_spawned_creatures_serialize_with_the_full_table() {
    let bestiary = Bestiary::standard();
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let ghast = bestiary.spawn("ghast", &mut rng).unwrap();

    let json = serde_json::to_value(&ghast).unwrap();
    let resistances = json["resistances"].as_object().unwrap();
    assert_eq!(resistances.len(), 27);
    assert_eq!(resistances["necrotic"]["mode"], "resistant");
    assert_eq!(resistances["poison"]["mode"], "immune");
    assert_eq!(resistances["cold"]["mode"], "normal");
}

#[test]
fn test_shared_handles_keep_team_views_in_sync() {
    let team = sample_team();
    let karg = Rc::clone(team.iter().next().unwrap());

    // damage through the handle; the team sees the same counters
    let report = karg.borrow_mut().damage(10, DamageType::Fire);
    // resistant: 10 / 2 + 2 flat = 7, shield of 4 absorbs first
    assert_eq!(report.final_amount, 7);
    assert_eq!(report.absorbed_by_shield, 4);
    assert_eq!(report.hp_lost, 3);

    let through_team = team.iter().next().unwrap().borrow();
    assert_eq!(through_team.hp.current(), 19);
    assert_eq!(through_team.hp.shield(), 0);
    assert_eq!(team.alive_members().len(), 1);
}

#[test]
fn test_reloaded_dead_creature_stays_unhealable_until_resurrected() {
    let team = sample_team();
    let json = serde_json::to_string(&team).unwrap();
    let back: Team = serde_json::from_str(&json).unwrap();

    let wisp = Rc::clone(back.iter().nth(1).unwrap());
    assert_eq!(wisp.borrow_mut().heal(10).healed_amount, 0);

    wisp.borrow_mut().resurrect().unwrap();
    assert!(wisp.borrow().alive);
    assert_eq!(wisp.borrow().hp.current(), 1);
    assert!(wisp.borrow_mut().heal(10).healed_amount > 0);
}
