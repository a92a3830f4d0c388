use proptest::prelude::*;
use tactics_engine::character::AttackSheet;
use tactics_engine::content::builtin_characters;
use tactics_engine::{
    ability_mod, Ability, AdMode, AttackRef, Character, CharacterSheet, Dice, EntityError, IdAllocator,
};

fn jake_sheet() -> CharacterSheet {
    serde_json::from_str(builtin_characters()["jake"]).expect("builtin sheet parses")
}

fn jake(ids: &mut IdAllocator) -> Character {
    Character::from_sheet(ids, jake_sheet()).expect("valid sheet")
}

fn club() -> AttackSheet {
    AttackSheet {
        name: "Club".into(),
        category: "melee".into(),
        range: "5/5".into(),
        atk_bonus: 2,
        dmg_rolls: vec!["1d4".into()],
        dmg_bonus: 0,
        dmg_type: "bludgeoning".into(),
        properties: vec![],
    }
}

#[test]
fn modifier_table_endpoints() {
    assert_eq!(ability_mod(1), -5);
    assert_eq!(ability_mod(9), -1);
    assert_eq!(ability_mod(10), 0);
    assert_eq!(ability_mod(11), 0);
    assert_eq!(ability_mod(30), 10);
}

proptest! {
    #[test]
    fn modifier_is_floor_of_half_offset(score in 1i32..=30) {
        let expected = ((score as f64 - 10.0) / 2.0).floor() as i32;
        prop_assert_eq!(ability_mod(score), expected);
    }
}

#[test]
fn sheet_fields_are_derived() {
    let mut ids = IdAllocator::new();
    let c = jake(&mut ids);
    assert_eq!(c.name(), "Jake");
    assert_eq!(c.icon(), 'J');
    assert_eq!(c.to_string(), "Jake_01");
    assert_eq!(c.armor_class(), 16);
    assert_eq!(c.hp(), 12);
    assert_eq!(c.max_hp(), 12);
    assert_eq!(c.speed(), 6);
    assert_eq!(c.ability_mod(Ability::Str), 3);
    assert_eq!(c.ability_mod(Ability::Cha), -1);
    assert_eq!(c.ability_modifiers()[1], (Ability::Dex, 2));
}

#[test]
fn speed_is_at_least_one_cell() {
    let mut ids = IdAllocator::new();
    let mut sheet = jake_sheet();
    sheet.speed = 0;
    let slow = Character::from_sheet(&mut ids, sheet).expect("valid sheet");
    assert_eq!(slow.speed(), 1);
}

#[test]
fn hp_setter_rejects_out_of_range_values() {
    let mut ids = IdAllocator::new();
    let mut c = jake(&mut ids);
    assert_eq!(c.set_hp(13), Err(EntityError::HpOutOfRange { value: 13, max: 12 }));
    assert!(c.set_hp(-1).is_err());
    assert_eq!(c.hp(), 12);

    c.set_hp(0).expect("0 is in range");
    assert!(!c.is_alive());
    c.set_hp(1).expect("1 is in range");
    assert!(c.is_alive());
}

#[test]
fn damage_stops_at_zero() {
    let mut ids = IdAllocator::new();
    let mut c = jake(&mut ids);
    assert_eq!(c.take_damage(5), 5);
    assert_eq!(c.hp(), 7);
    assert_eq!(c.take_damage(50), 7);
    assert_eq!(c.hp(), 0);
    assert!(!c.is_alive());
    assert_eq!(c.take_damage(-3), 0);
}

#[test]
fn speed_setter_is_capped_by_max() {
    let mut ids = IdAllocator::new();
    let mut c = jake(&mut ids);
    assert!(c.set_speed(7).is_err());
    c.set_speed(2).expect("below max");
    assert_eq!(c.speed(), 2);
    assert_eq!(c.max_speed(), 6);
}

#[test]
fn reset_restores_sheet_state() {
    let mut ids = IdAllocator::new();
    let mut c = jake(&mut ids);
    let id = c.id();
    c.take_damage(8);
    c.set_speed(1).expect("below max");
    c.reset().expect("sheet still valid");
    assert_eq!(c.hp(), 12);
    assert_eq!(c.speed(), 6);
    assert_eq!(c.id(), id);
    assert_eq!(c.goal, None);
}

#[test]
fn attack_refs_resolve_through_one_lookup() {
    let mut ids = IdAllocator::new();
    let c = jake(&mut ids);

    assert_eq!(c.main_attack().name, "Longsword");
    assert_eq!(c.attack(&AttackRef::Default).map(|a| a.name.as_str()), Ok("Longsword"));

    let by_name = AttackRef::ByName("Javelin".into());
    let javelin = c.attack(&by_name).expect("known attack");
    assert_eq!(javelin.reach, (30, 120));
    assert!(javelin.properties.contains("thrown"));

    let direct = AttackRef::Direct(javelin.clone());
    assert_eq!(c.attack(&direct).map(|a| a.reach), Ok((30, 120)));

    assert!(matches!(
        c.attack(&AttackRef::ByName("Bow".into())),
        Err(EntityError::UnknownAttack { .. })
    ));
    assert_eq!(c.attacks().count(), 2);
}

#[test]
fn named_attack_outlives_the_lookup_key() {
    let mut ids = IdAllocator::new();
    let c = jake(&mut ids);

    let javelin = c.attack_named(&String::from("Javelin")).expect("known attack");
    assert_eq!(javelin.name, "Javelin");
    assert_eq!(c.attack_named("Bow").map(|a| a.name.clone()), Err(EntityError::UnknownAttack {
        character: "Jake".to_string(),
        attack: "Bow".to_string(),
    }));
}

#[test]
fn invalid_sheets_are_rejected() {
    let mut ids = IdAllocator::new();

    let mut no_attacks = jake_sheet();
    no_attacks.attacks.clear();
    assert!(matches!(
        Character::from_sheet(&mut ids, no_attacks),
        Err(EntityError::NoAttacks(_))
    ));

    let mut twice = jake_sheet();
    twice.attacks = vec![club(), club()];
    assert!(matches!(
        Character::from_sheet(&mut ids, twice),
        Err(EntityError::DuplicateAttack { .. })
    ));

    let mut bad_range = jake_sheet();
    let mut atk = club();
    atk.range = "far".into();
    bad_range.attacks = vec![atk];
    assert!(matches!(
        Character::from_sheet(&mut ids, bad_range),
        Err(EntityError::InvalidRange(_))
    ));

    let mut bad_dice = jake_sheet();
    let mut atk = club();
    atk.dmg_rolls = vec!["1x4".into()];
    bad_dice.attacks = vec![atk];
    assert!(matches!(
        Character::from_sheet(&mut ids, bad_dice),
        Err(EntityError::Dice(_))
    ));

    let mut dead = jake_sheet();
    dead.hp = 0;
    assert!(matches!(
        Character::from_sheet(&mut ids, dead),
        Err(EntityError::InvalidStartingHp(_))
    ));
}

#[test]
fn initiative_and_saves_add_ability_modifier() {
    let mut ids = IdAllocator::new();
    let c = jake(&mut ids);

    let mut dice = Dice::from_scripted(vec![10]);
    assert_eq!(c.roll_initiative(&mut dice), 12);

    let mut dice = Dice::from_scripted(vec![12]);
    let save = c.saving_throw(&mut dice, Ability::Wis, AdMode::Normal, 13);
    assert_eq!(save.roll, 12);
    assert_eq!(save.total, 13);
    assert!(save.passed);
}

#[test]
fn each_character_gets_its_own_id() {
    let mut ids = IdAllocator::new();
    let a = jake(&mut ids);
    let b = jake(&mut ids);
    assert_ne!(a.id(), b.id());
    assert_eq!(b.token().label(), "Jake_02");
    assert_eq!(a.token().to_string(), "Jake (J)");
}
