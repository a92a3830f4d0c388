use std::collections::HashSet;

use tactics_engine::content::{builtin_catalog, builtin_scenarios};
use tactics_engine::scenario::{parse_reference, MemberSpec, Scenario, ScenarioError, Source};
use tactics_engine::IdAllocator;

#[test]
fn builtin_catalog_loads() {
    let catalog = builtin_catalog().expect("builtin content");
    assert_eq!(catalog.len(), 6);
    assert_eq!(catalog.resolve("monster.orc").ok().map(|s| s.hp), Some(15));
    assert_eq!(
        catalog.resolve(" Character.JAKE ").ok().map(|s| s.name.as_str()),
        Some("Jake")
    );
}

#[test]
fn bad_references_are_reported() {
    let catalog = builtin_catalog().expect("builtin content");
    assert!(matches!(catalog.resolve("orc"), Err(ScenarioError::MalformedRef(_))));
    assert!(matches!(catalog.resolve("npc.orc"), Err(ScenarioError::UnknownSource(_))));
    assert!(matches!(
        catalog.resolve("monster.dragon"),
        Err(ScenarioError::UnknownCharacter { kind: "monster", .. })
    ));
    assert!(matches!(parse_reference("monster.Orc"), Ok((Source::Monster, ref n)) if n == "orc"));
}

#[test]
fn member_entries_accept_both_shapes() {
    let one: MemberSpec = serde_json::from_str(r#""monster.orc""#).expect("string form");
    assert_eq!(one.reference(), "monster.orc");
    assert_eq!(one.count(), 1);

    let many: MemberSpec = serde_json::from_str(r#"{"ref": "monster.orc", "count": 3}"#).expect("counted form");
    assert_eq!(many.reference(), "monster.orc");
    assert_eq!(many.count(), 3);
}

#[test]
fn json_scenario_builds_teams_with_unique_ids() {
    let catalog = builtin_catalog().expect("builtin content");
    let scenario = Scenario::from_json(builtin_scenarios()["orcs_vs_commoners"]).expect("valid scenario");
    let mut ids = IdAllocator::new();
    let teams = scenario.build_teams(&catalog, &mut ids).expect("known members");

    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0].name(), "ORC BRIGADE");
    assert_eq!(teams[0].len(), 3);
    assert_eq!(teams[1].len(), 8);

    let unique: HashSet<_> = teams.iter().flat_map(|t| t.members()).map(|m| m.id()).collect();
    assert_eq!(unique.len(), 11);
}

#[test]
fn yaml_scenario_mixes_characters_and_monsters() {
    let catalog = builtin_catalog().expect("builtin content");
    let scenario = Scenario::from_yaml(builtin_scenarios()["heroes_vs_zombies"]).expect("valid scenario");
    let mut ids = IdAllocator::new();
    let teams = scenario.build_teams(&catalog, &mut ids).expect("known members");

    let names: Vec<&str> = teams[0].members().iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["Jake", "Mortimer"]);
    assert_eq!(teams[1].name(), "Zombie Patrol");
    assert_eq!(teams[1].len(), 2);
    assert_eq!(teams[1].members()[0].speed(), 4);
}

#[test]
fn unknown_member_fails_the_build() {
    let catalog = builtin_catalog().expect("builtin content");
    let scenario = Scenario::from_json(
        r#"{"team1": {"name": "A", "members": ["monster.orc"]},
            "team2": {"name": "B", "members": ["monster.beholder"]}}"#,
    )
    .expect("valid shape");
    let mut ids = IdAllocator::new();
    assert!(matches!(
        scenario.build_teams(&catalog, &mut ids),
        Err(ScenarioError::UnknownCharacter { .. })
    ));
}
