use proptest::prelude::*;
use tactics_engine::{parse_die, AdMode, DamageDice, Dice, DiceError};

#[test]
fn parse_die_returns_sides_then_count() {
    assert_eq!(parse_die("1d8"), Ok((8, 1)));
    assert_eq!(parse_die(" 12d3 "), Ok((3, 12)));
    assert_eq!(parse_die("2D6"), Ok((6, 2)));
}

#[test]
fn parse_die_rejects_malformed_expressions() {
    assert!(matches!(parse_die("8"), Err(DiceError::MissingSeparator(_))));
    assert!(matches!(parse_die("d8"), Err(DiceError::NotANumber { .. })));
    assert!(matches!(parse_die("2dx"), Err(DiceError::NotANumber { .. })));
    assert!(matches!(parse_die("1d0"), Err(DiceError::ZeroSides(_))));
}

#[test]
fn damage_dice_parse_and_display() {
    let dd: DamageDice = "2d6".parse().expect("valid dice");
    assert_eq!(dd, DamageDice::new(2, 6));
    assert_eq!(dd.to_string(), "2d6");
}

#[test]
fn degenerate_dice_need_no_randomness() {
    let mut dice = Dice::from_seed(1);
    assert_eq!(dice.roll(1, 3, AdMode::Normal), 3);
    assert_eq!(dice.roll(0, 3, AdMode::Advantage), 0);
}

#[test]
fn scripted_faces_pick_kept_d20() {
    assert_eq!(Dice::from_scripted(vec![5, 17]).d20(AdMode::Advantage), 17);
    assert_eq!(Dice::from_scripted(vec![5, 17]).d20(AdMode::Disadvantage), 5);
    assert_eq!(Dice::from_scripted(vec![5, 17]).d20(AdMode::Normal), 5);
}

#[test]
fn advantage_never_below_normal_never_below_disadvantage() {
    for seed in 0..200 {
        let adv = Dice::from_seed(seed).d20(AdMode::Advantage);
        let normal = Dice::from_seed(seed).d20(AdMode::Normal);
        let dis = Dice::from_seed(seed).d20(AdMode::Disadvantage);
        assert!(adv >= normal, "seed {seed}: {adv} < {normal}");
        assert!(normal >= dis, "seed {seed}: {normal} < {dis}");
    }
}

#[test]
fn same_seed_same_stream() {
    let mut a = Dice::from_seed(2025);
    let mut b = Dice::from_seed(2025);
    let ra: Vec<u32> = (0..50).map(|_| a.roll(6, 2, AdMode::Normal)).collect();
    let rb: Vec<u32> = (0..50).map(|_| b.roll(6, 2, AdMode::Normal)).collect();
    assert_eq!(ra, rb);
}

#[test]
fn reseed_restarts_the_seeded_stream() {
    let mut dice = Dice::from_seed(1);
    dice.roll(6, 4, AdMode::Normal);
    dice.reseed(77);
    let mut fresh = Dice::from_seed(77);
    let ra: Vec<u32> = (0..20).map(|_| dice.roll(8, 2, AdMode::Normal)).collect();
    let rb: Vec<u32> = (0..20).map(|_| fresh.roll(8, 2, AdMode::Normal)).collect();
    assert_eq!(ra, rb);
}

#[test]
fn reseed_drops_leftover_scripted_faces() {
    let mut dice = Dice::from_scripted(vec![20, 20, 20]);
    assert_eq!(dice.d20(AdMode::Normal), 20);
    dice.reseed(7);
    let expected: Vec<u32> = {
        let mut fresh = Dice::from_seed(7);
        (0..5).map(|_| fresh.d20(AdMode::Normal)).collect()
    };
    let got: Vec<u32> = (0..5).map(|_| dice.d20(AdMode::Normal)).collect();
    assert_eq!(got, expected);
}

#[test]
fn pick_index_on_empty_range_is_none() {
    let mut dice = Dice::from_seed(3);
    assert_eq!(dice.pick_index(0), None);
    assert!(dice.pick_index(4).is_some_and(|i| i < 4));
}

proptest! {
    #[test]
    fn roll_stays_within_pool_bounds(seed in any::<u64>(), sides in 2u32..=20, count in 1u32..=10) {
        let mut dice = Dice::from_seed(seed);
        let r = dice.roll(sides, count, AdMode::Normal);
        prop_assert!(r >= count && r <= count * sides);
    }
}
