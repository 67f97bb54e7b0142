//! HeartQuest Headless Simulation Harness
//!
//! Drives the progression rules, the mini-game sessions and the boss fight
//! on logical clocks and checks their invariants. Runs entirely in-process:
//! no UI, no files apart from the bundled scenario data.
//!
//! Usage:
//!   cargo run -p heartquest-simtest
//!   cargo run -p heartquest-simtest -- --verbose

use heartquest_core::boss::{BossAction, BossEncounter, BossState};
use heartquest_core::config::EngineConfig;
use heartquest_core::context::{MiniGameOutcome, ProgressContext};
use heartquest_core::engine::{GameEngine, SessionHandle};
use heartquest_core::persistence;
use heartquest_core::session::{BoardSnapshot, PlayerAction, SessionPhase};
use heartquest_core::store::{keys, KeyValueStore, MemoryStore};
use heartquest_logic::boss as boss_rules;
use heartquest_logic::constants::limits;
use heartquest_logic::games::GameKind;
use heartquest_logic::progression::{self, LevelStatus};
use heartquest_logic::scoring;
use serde::Deserialize;

// ── Progression scenarios (scripted results with expected end state) ───
const SCENARIOS_JSON: &str = include_str!("../../../data/progression_scenarios.json");

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    results: Vec<ScriptedResult>,
    hearts: u32,
    xp: u32,
    statuses: Vec<LevelStatus>,
}

#[derive(Debug, Deserialize)]
struct ScriptedResult {
    kind: GameKind,
    raw_score: u32,
    success: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== HeartQuest Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Scripted progression scenarios
    results.extend(validate_scenarios(verbose));

    // 2. Bounds sweep over every kind / score / outcome
    results.extend(validate_progression_bounds(verbose));

    // 3. Scoring formulas
    results.extend(validate_scoring(verbose));

    // 4. Mini-game sessions through the engine
    results.extend(validate_sessions(verbose));

    // 5. Boss encounter
    results.extend(validate_boss(verbose));

    // 6. Storage fallback, save slots and reset
    results.extend(validate_storage(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn quiet_config(seed: u64) -> EngineConfig {
    EngineConfig {
        power_up_chance: 0.0,
        boss_attack_chance: 0.0,
        ..EngineConfig::seeded(seed)
    }
}

// ── 1. Scenarios ────────────────────────────────────────────────────────

fn validate_scenarios(verbose: bool) -> Vec<TestResult> {
    println!("--- Progression Scenarios ---");
    let mut results = Vec::new();

    let scenarios: Vec<Scenario> = match serde_json::from_str(SCENARIOS_JSON) {
        Ok(s) => s,
        Err(e) => {
            results.push(TestResult {
                name: "scenarios_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    results.push(TestResult {
        name: "scenarios_not_empty".into(),
        passed: !scenarios.is_empty(),
        detail: format!("{} scenarios", scenarios.len()),
    });

    for scenario in &scenarios {
        let mut ctx = ProgressContext::in_memory();
        for (i, step) in scenario.results.iter().enumerate() {
            let outcome = MiniGameOutcome {
                kind: step.kind,
                score: step.raw_score,
                raw_score: step.raw_score,
                success: step.success,
            };
            let report = ctx.apply_outcome(&outcome, i as u64);
            if verbose {
                println!(
                    "  {} #{}: {} {} → +{} XP, {} hearts",
                    scenario.name, i, step.kind, step.raw_score, report.xp_awarded, report.hearts
                );
            }
        }

        let statuses: Vec<LevelStatus> = (1..=5).map(|l| ctx.level_status(l)).collect();
        results.push(TestResult {
            name: format!("scenario_{}", scenario.name),
            passed: ctx.hearts() == scenario.hearts
                && ctx.xp() == scenario.xp
                && statuses == scenario.statuses,
            detail: format!(
                "hearts {} (want {}), xp {} (want {}), levels {:?}",
                ctx.hearts(),
                scenario.hearts,
                ctx.xp(),
                scenario.xp,
                statuses
            ),
        });
    }

    results
}

// ── 2. Bounds ───────────────────────────────────────────────────────────

fn validate_progression_bounds(_verbose: bool) -> Vec<TestResult> {
    println!("--- Progression Bounds ---");
    let mut results = Vec::new();

    let mut ctx = ProgressContext::in_memory();
    let mut in_range = true;
    let mut steps = 0;
    for round in 0..4u32 {
        for kind in GameKind::ALL {
            for raw_score in [0, 5, 15, 40, 120] {
                for success in [round % 2 == 0, round % 2 == 1] {
                    let outcome = MiniGameOutcome {
                        kind,
                        score: raw_score,
                        raw_score,
                        success,
                    };
                    ctx.apply_outcome(&outcome, steps);
                    steps += 1;
                    in_range &= ctx.hearts() <= limits::MAX_HEARTS && ctx.xp() <= limits::MAX_XP;
                }
            }
        }
    }
    results.push(TestResult {
        name: "hearts_and_xp_bounded".into(),
        passed: in_range,
        detail: format!("{} outcomes applied, ended at {} hearts / {} XP", steps, ctx.hearts(), ctx.xp()),
    });

    // XP is zero for failures and at least the floor for scored successes
    let xp_ok = GameKind::ALL.iter().all(|&kind| {
        (1..200).all(|raw| {
            progression::normalize_xp(kind, raw, false) == 0
                && progression::normalize_xp(kind, raw, true) >= 5
        })
    });
    results.push(TestResult {
        name: "xp_table_floor".into(),
        passed: xp_ok,
        detail: "failure → 0, success → ≥ 5 for raw 1..200".into(),
    });

    // Completing the same game twice leaves the records unchanged
    let mut levels = progression::default_level_progress();
    progression::complete_game(&mut levels, 1, GameKind::HeartClick);
    let once = levels.clone();
    progression::complete_game(&mut levels, 1, GameKind::HeartClick);
    results.push(TestResult {
        name: "complete_game_idempotent".into(),
        passed: levels == once,
        detail: format!("level 1 completed: {:?}", levels[0].completed_games),
    });

    results
}

// ── 3. Scoring ──────────────────────────────────────────────────────────

fn validate_scoring(_verbose: bool) -> Vec<TestResult> {
    println!("--- Scoring Formulas ---");
    let mut results = Vec::new();

    let final_score = scoring::heart_click_final_score(15, None);
    let xp = progression::normalize_xp(GameKind::HeartClick, 15, true);
    results.push(TestResult {
        name: "heart_click_15".into(),
        passed: final_score == 30 && scoring::heart_click_success(15) && xp == 5,
        detail: format!("raw 15 → final {}, XP {}", final_score, xp),
    });

    results.push(TestResult {
        name: "mismatch_floor".into(),
        passed: scoring::apply_penalty(0, 5) == 0 && scoring::apply_penalty(3, 5) == 0,
        detail: "penalties never go below zero".into(),
    });

    let fast = scoring::reaction_points(100, None);
    let slow = scoring::reaction_points(5_000, None);
    results.push(TestResult {
        name: "reaction_points".into(),
        passed: fast == 10 && slow == 1,
        detail: format!("100ms → {}, 5000ms → {}", fast, slow),
    });

    let damages: Vec<u32> = (1..=8).map(boss_rules::click_damage).collect();
    results.push(TestResult {
        name: "combo_damage_curve".into(),
        passed: damages[3] == 9 && damages.windows(2).all(|w| w[0] <= w[1]) && damages[7] == 11,
        detail: format!("damage by combo {:?}", damages),
    });

    results
}

// ── 4. Sessions ─────────────────────────────────────────────────────────

fn run_until_finished<S: KeyValueStore>(
    engine: &mut GameEngine<S>,
    game: SessionHandle,
    limit_ms: u64,
    mut on_tick: impl FnMut(&mut GameEngine<S>),
) -> bool {
    let mut elapsed = 0;
    while elapsed < limit_ms {
        let finished = engine
            .session_snapshot(game)
            .is_some_and(|s| s.phase == SessionPhase::Finished);
        if finished {
            return true;
        }
        engine.advance(100);
        elapsed += 100;
        on_tick(engine);
    }
    false
}

fn validate_sessions(verbose: bool) -> Vec<TestResult> {
    println!("--- Mini-Game Sessions ---");
    let mut results = Vec::new();
    let mut engine = GameEngine::new(quiet_config(7));

    // Heart click with every target caught
    let game = engine.start_mini_game(GameKind::HeartClick);
    let finished = run_until_finished(&mut engine, game, 30_000, |engine| {
        if let Some(BoardSnapshot::HeartClick { targets }) = engine.session_snapshot(game).map(|s| s.board) {
            for (target, _) in targets {
                engine.handle_player_action(game, PlayerAction::ClickTarget(target.id));
            }
        }
    });
    let outcome = engine.session_snapshot(game).and_then(|s| s.outcome);
    results.push(TestResult {
        name: "heart_click_perfect".into(),
        passed: finished && outcome.is_some_and(|o| o.raw_score == 20 && o.score == 40 && o.success),
        detail: format!("{:?}", outcome),
    });

    // Heart click left alone fails
    let game = engine.start_mini_game(GameKind::HeartClick);
    let finished = run_until_finished(&mut engine, game, 30_000, |_| {});
    let outcome = engine.session_snapshot(game).and_then(|s| s.outcome);
    results.push(TestResult {
        name: "heart_click_idle_fails".into(),
        passed: finished && outcome.is_some_and(|o| o.score == 0 && !o.success),
        detail: format!("{:?}", outcome),
    });

    // Word match solved pair by pair
    let game = engine.start_mini_game(GameKind::WordMatch);
    engine.advance(500);
    if let Some(BoardSnapshot::WordMatch { words }) = engine.session_snapshot(game).map(|s| s.board) {
        for pair in 0..6 {
            for word in words.iter().filter(|w| w.pair_id == pair) {
                engine.handle_player_action(game, PlayerAction::SelectWord(word.id));
            }
            engine.advance(800);
        }
    }
    engine.advance(300);
    let outcome = engine.session_snapshot(game).and_then(|s| s.outcome);
    results.push(TestResult {
        name: "word_match_solved".into(),
        passed: outcome.is_some_and(|o| o.score == 60 && o.success),
        detail: format!("{:?}", outcome),
    });

    // Puzzle dealt solved finishes on activation
    let game = engine.start_puzzle_with_tiles((1..=9).collect());
    engine.advance(500);
    let outcome = engine.session_snapshot(game).and_then(|s| s.outcome);
    results.push(TestResult {
        name: "puzzle_presolved_bonus".into(),
        passed: outcome.is_some_and(|o| o.score == 50 && o.success),
        detail: format!("{:?}", outcome),
    });

    // Reaction ended without a hit fails
    let game = engine.start_mini_game(GameKind::Reaction);
    engine.advance(500);
    engine.handle_player_action(game, PlayerAction::EndGame);
    let outcome = engine.session_snapshot(game).and_then(|s| s.outcome);
    results.push(TestResult {
        name: "reaction_empty_run".into(),
        passed: outcome.is_some_and(|o| !o.success),
        detail: format!("{:?}", outcome),
    });

    let reports = engine.drain_reports();
    if verbose {
        for report in &reports {
            println!(
                "  {} → record {}, +{} XP, {} hearts",
                report.outcome.kind, report.new_record, report.xp_awarded, report.hearts
            );
        }
    }
    results.push(TestResult {
        name: "each_session_reported_once".into(),
        passed: reports.len() == 5,
        detail: format!("{} reports", reports.len()),
    });

    results
}

// ── 5. Boss ─────────────────────────────────────────────────────────────

fn validate_boss(verbose: bool) -> Vec<TestResult> {
    println!("--- Boss Encounter ---");
    let mut results = Vec::new();
    let mut engine = GameEngine::new(quiet_config(11));

    // Four quick clicks build a combo of four
    let boss = engine.start_boss_encounter();
    let mut last_damage = 0;
    for i in 0..4 {
        if i > 0 {
            engine.advance(300);
        }
        let before = engine.boss_snapshot(boss).map_or(0, |s| s.boss_health);
        engine.handle_boss_action(boss, BossAction::AttackBoss);
        last_damage = before - engine.boss_snapshot(boss).map_or(0, |s| s.boss_health);
    }
    let combo = engine.boss_snapshot(boss).map_or(0, |s| s.combo);
    results.push(TestResult {
        name: "boss_combo_four".into(),
        passed: combo == 4 && last_damage == 9,
        detail: format!("combo {}, last hit {}", combo, last_damage),
    });

    // Phases only move forward while the boss goes down
    let mut phases = Vec::new();
    while engine.boss_snapshot(boss).is_some_and(|s| s.state == BossState::Active) {
        engine.advance(300);
        engine.handle_boss_action(boss, BossAction::AttackBoss);
        if let Some(snapshot) = engine.boss_snapshot(boss) {
            phases.push(snapshot.phase);
        }
    }
    let snapshot = engine.boss_snapshot(boss);
    results.push(TestResult {
        name: "boss_defeated".into(),
        passed: snapshot.as_ref().is_some_and(|s| s.state == BossState::Defeated && s.report.is_some())
            && phases.windows(2).all(|w| w[0] <= w[1])
            && phases.last() == Some(&3),
        detail: format!("report {:?}", snapshot.and_then(|s| s.report)),
    });

    // Default attack chance: an idle player always loses eventually
    let mut lost = 0;
    let seeds = 0..10u64;
    for seed in seeds.clone() {
        let mut encounter = BossEncounter::new(rand_seeded(seed), EngineConfig::default().boss_attack_chance);
        encounter.advance(600_000);
        if encounter.state() == BossState::PlayerDefeated {
            lost += 1;
        }
        if verbose {
            println!("  seed {} → {:?} after {}ms", seed, encounter.state(), encounter.now());
        }
    }
    results.push(TestResult {
        name: "boss_idle_player_loses".into(),
        passed: lost == seeds.count(),
        detail: format!("{} of 10 idle runs lost", lost),
    });

    results
}

fn rand_seeded(seed: u64) -> rand::rngs::StdRng {
    rand::SeedableRng::seed_from_u64(seed)
}

// ── 6. Storage ──────────────────────────────────────────────────────────

fn validate_storage(_verbose: bool) -> Vec<TestResult> {
    println!("--- Storage ---");
    let mut results = Vec::new();

    // Corrupt records read as defaults
    let mut store = MemoryStore::new();
    store.set(keys::LEADERBOARD, "{not json".into());
    store.set(keys::LEVEL_PROGRESS, "[1, 2, 3]".into());
    store.set(keys::HEARTS, "lots".into());
    store.set(keys::XP, "-4".into());
    let ctx = ProgressContext::new(store);
    results.push(TestResult {
        name: "corrupt_store_defaults".into(),
        passed: ctx.leaderboard().is_empty()
            && ctx.level_progress() == progression::default_level_progress()
            && ctx.hearts() == limits::INITIAL_HEARTS
            && ctx.xp() == limits::INITIAL_XP,
        detail: format!("hearts {}, xp {}", ctx.hearts(), ctx.xp()),
    });

    // Save slot round trip
    let mut ctx = ProgressContext::in_memory();
    ctx.apply_outcome(
        &MiniGameOutcome {
            kind: GameKind::Memory,
            score: 70,
            raw_score: 70,
            success: true,
        },
        1,
    );
    let mut slot = Vec::new();
    let saved = persistence::save_progress(&mut slot, &ctx);
    let mut restored = ProgressContext::in_memory();
    let loaded = persistence::load_progress(slot.as_slice(), &mut restored);
    results.push(TestResult {
        name: "save_slot_round_trip".into(),
        passed: saved.is_ok()
            && loaded.is_ok()
            && restored.xp() == ctx.xp()
            && restored.best_score(GameKind::Memory) == 70
            && restored.level_progress() == ctx.level_progress(),
        detail: format!("{} bytes", slot.len()),
    });

    // Reset wipes everything back to first run
    ctx.reset_all_progress();
    results.push(TestResult {
        name: "reset_all_progress".into(),
        passed: ctx.hearts() == limits::INITIAL_HEARTS
            && ctx.xp() == 0
            && ctx.leaderboard().is_empty()
            && ctx.level_progress() == progression::default_level_progress(),
        detail: format!("{} keys left", ctx.store().len()),
    });

    results
}
