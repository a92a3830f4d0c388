use tactics_engine::{AttackRecord, CombatLog, EncounterId, TokenId};

fn record(enc: u32, attacker: u32, victim: u32, hit: bool, damage: i32) -> AttackRecord {
    AttackRecord {
        encounter_id: EncounterId(enc),
        attacker_id: TokenId(attacker),
        attacker_name: format!("a{attacker}"),
        victim_id: TokenId(victim),
        victim_name: format!("a{victim}"),
        hit,
        damage,
    }
}

fn sample() -> CombatLog {
    let mut log = CombatLog::new();
    log.push(record(1, 1, 2, true, 6));
    log.push(record(1, 2, 1, false, 0));
    log.push(record(1, 1, 2, true, 4));
    log.push(record(2, 1, 3, false, 0));
    log
}

#[test]
fn totals_per_combatant() {
    let stats = sample().summarize();
    let ids: Vec<TokenId> = stats.keys().copied().collect();
    assert_eq!(ids, vec![TokenId(1), TokenId(2), TokenId(3)]);

    let a1 = &stats[&TokenId(1)];
    assert_eq!(a1.attacks, 3);
    assert_eq!(a1.hits, 2);
    assert_eq!(a1.damage_dealt, 10);
    assert_eq!(a1.times_targeted, 1);
    assert_eq!(a1.dpr(), 5.0);
    assert!((a1.hit_ratio() - 2.0 / 3.0).abs() < 1e-9);

    let a2 = &stats[&TokenId(2)];
    assert_eq!(a2.damage_taken, 10);
    assert_eq!(a2.avg_damage_taken(), 5.0);
    assert_eq!(a2.dpr(), 0.0);
}

#[test]
fn summary_line_format() {
    let stats = sample().summarize();
    assert_eq!(
        stats[&TokenId(1)].summary_line(),
        "Dealt: 10 (3.33), Taken: 0 (0.00), Hit Ratio: 2/3 (66.7%)"
    );
}

#[test]
fn filter_by_encounter() {
    let log = sample();
    assert_eq!(log.for_encounter(EncounterId(1)).count(), 3);
    assert_eq!(log.for_encounter(EncounterId(2)).count(), 1);
    assert_eq!(log.for_encounter(EncounterId(3)).count(), 0);
}

#[test]
fn merge_keeps_order() {
    let mut log = CombatLog::new();
    assert!(log.is_empty());
    log.push(record(1, 5, 6, true, 1));
    log.extend(sample());
    assert_eq!(log.len(), 5);
    assert_eq!(log.records()[0].attacker_id, TokenId(5));
    assert_eq!(log.records()[4].encounter_id, EncounterId(2));
}

#[test]
fn json_lines_export() {
    let log = sample();
    let mut out = Vec::new();
    log.write_json_lines(&mut out).expect("write to vec");
    let text = String::from_utf8(out).expect("utf-8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);

    let first: AttackRecord = serde_json::from_str(lines[0]).expect("record json");
    assert_eq!(first, log.records()[0]);
    let raw: serde_json::Value = serde_json::from_str(lines[1]).expect("json");
    assert_eq!(raw["attacker_id"], 2);
    assert_eq!(raw["hit"], false);
}
