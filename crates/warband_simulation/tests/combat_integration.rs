//! Combat integration tests
//!
//! Headless App со всеми plugins, тики гоняются напрямую через FixedUpdate.
//!
//! Проверяем:
//! - Director: не больше N атакующих одновременно
//! - Фазы босса, SuperArmor, страх, реакции на снаряды
//! - Pool hooks (release / acquire)
//! - Поведение архетипов (turret, shooter, stalker)

use std::sync::Arc;

use bevy::prelude::*;
use warband_simulation::ai::{RuleCondition, TransitionRule};
use warband_simulation::combat::{AffixSet, AttackLanded, PoiseBroken};
use warband_simulation::config::{AffixDef, AffixEffect, AttackKind, AttackPattern, BossPhase, TurretParams};
use warband_simulation::physics::Motor;
use warband_simulation::spatial::{Collider, LAYER_PROJECTILE};
use warband_simulation::*;

const DT: f32 = 1.0 / 60.0;

fn stats(name: &str) -> EnemyStats {
    EnemyStats {
        name: name.to_string(),
        ..Default::default()
    }
}

fn spawn_player(app: &mut App, position: Vec2) -> Entity {
    app.world_mut()
        .spawn((PlayerAdversary, Transform::from_xyz(position.x, position.y, 0.0)))
        .id()
}

/// Агент смотрит на `look_at` (иначе vision cone его не пустит)
fn spawn(app: &mut App, stats: EnemyStats, archetype: Archetype, position: Vec2, look_at: Vec2) -> Entity {
    spawn_agent(
        app.world_mut(),
        AgentSpawn::new(Arc::new(stats), archetype)
            .at(position)
            .facing(look_at - position),
    )
}

fn ticks(app: &mut App, n: usize) {
    for _ in 0..n {
        step(app, DT);
    }
}

fn state(app: &App, entity: Entity) -> Option<StateId> {
    app.world().get::<Brain>(entity).and_then(|b| b.current_state())
}

fn body(app: &App, entity: Entity) -> &CombatBody {
    app.world().get::<CombatBody>(entity).unwrap()
}

/// Все события типа T с начала прогона (буферы живут один тик, копим сами)
#[derive(Resource)]
struct Recorded<T: Event>(Vec<T>);

fn record<T: Event + Clone>(mut reader: EventReader<T>, mut recorded: ResMut<Recorded<T>>) {
    recorded.0.extend(reader.read().cloned());
}

fn record_events<T: Event + Clone>(app: &mut App) {
    app.insert_resource(Recorded::<T>(Vec::new()))
        .add_systems(FixedUpdate, record::<T>.after(WarbandSet::Cleanup));
}

fn with_recorders(mut app: App) -> App {
    record_events::<AgentIntent>(&mut app);
    record_events::<DamageRequest>(&mut app);
    record_events::<DamageTaken>(&mut app);
    record_events::<AttackLanded>(&mut app);
    record_events::<PoiseBroken>(&mut app);
    record_events::<AgentDied>(&mut app);
    record_events::<PhaseChanged>(&mut app);
    app
}

fn test_app(seed: u64) -> App {
    with_recorders(create_headless_app(seed))
}

fn events<T: Event + Clone>(app: &App) -> Vec<T> {
    app.world().resource::<Recorded<T>>().0.clone()
}

fn damage(app: &mut App, target: Entity, amount: f32) {
    app.world_mut().send_event(DamageRequest {
        target,
        source: None,
        amount,
        knockback_direction: Vec2::ZERO,
        knockback_force: 0.0,
    });
}

fn intents_of(app: &App, agent: Entity) -> Vec<AgentIntent> {
    events::<AgentIntent>(app).into_iter().filter(|i| i.agent() == agent).collect()
}

// ============================================================================
// Director
// ============================================================================

#[test]
fn test_director_caps_concurrent_attackers() {
    let mut app = test_app(42);
    spawn_player(&mut app, Vec2::ZERO);

    let positions = [Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0), Vec2::new(0.0, 1.0)];
    let rushers: Vec<Entity> = positions
        .iter()
        .map(|p| spawn(&mut app, stats("Grunt"), Archetype::Rusher, *p, Vec2::ZERO))
        .collect();

    let mut saw_orbit = false;
    for _ in 0..120 {
        step(&mut app, DT);

        let director = app.world().resource::<AttackDirector>();
        assert!(director.held_count() <= 2, "more than 2 tokens handed out");

        let engaged = rushers.iter().filter(|e| state(&app, **e) == Some(StateId::Engage)).count();
        assert!(engaged <= 2, "{} agents engaging at once", engaged);
        saw_orbit |= rushers.iter().any(|e| state(&app, *e) == Some(StateId::Orbit));
    }

    assert!(saw_orbit, "third rusher never had to wait in Orbit");
}

#[test]
fn test_without_director_everyone_attacks() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(WarbandPlugin {
        director: None,
        ..Default::default()
    });
    init_logger();
    spawn_player(&mut app, Vec2::ZERO);

    let positions = [Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0), Vec2::new(0.0, 1.0)];
    let rushers: Vec<Entity> = positions
        .iter()
        .map(|p| spawn(&mut app, stats("Grunt"), Archetype::Rusher, *p, Vec2::ZERO))
        .collect();

    // build → Idle → Chase → Engage
    ticks(&mut app, 3);

    assert!(!app.world().contains_resource::<AttackDirector>());
    for rusher in rushers {
        assert_eq!(state(&app, rusher), Some(StateId::Engage));
    }
}

#[test]
fn test_dead_holder_loses_token() {
    let mut app = test_app(7);
    spawn_player(&mut app, Vec2::ZERO);
    let rusher = spawn(&mut app, stats("Grunt"), Archetype::Rusher, Vec2::new(1.0, 0.0), Vec2::ZERO);

    ticks(&mut app, 3);
    assert!(app.world().resource::<AttackDirector>().holds(rusher));

    damage(&mut app, rusher, 500.0);
    step(&mut app, DT);

    assert!(!body(&app, rusher).is_alive());
    assert!(!app.world().resource::<AttackDirector>().holds(rusher));
    assert_eq!(events::<AgentDied>(&app).len(), 1);
}

#[test]
fn test_disabled_holder_token_goes_to_waiting_agent() {
    let mut app = test_app(42);
    spawn_player(&mut app, Vec2::ZERO);

    let positions = [Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0), Vec2::new(0.0, 1.0)];
    let rushers: Vec<Entity> = positions
        .iter()
        .map(|p| spawn(&mut app, stats("Grunt"), Archetype::Rusher, *p, Vec2::ZERO))
        .collect();

    ticks(&mut app, 4);
    let holder = *rushers
        .iter()
        .find(|e| state(&app, **e) == Some(StateId::Engage))
        .unwrap();
    let waiting = *rushers
        .iter()
        .find(|e| state(&app, **e) == Some(StateId::Orbit))
        .unwrap();
    assert_eq!(app.world().resource::<AttackDirector>().held_count(), 2);

    // Выключен посреди Engage: живой, но токен держать не может
    app.world_mut().entity_mut(holder).insert(AiDisabled);
    step(&mut app, DT);

    let director = app.world().resource::<AttackDirector>();
    assert!(!director.holds(holder));
    assert_eq!(director.held_count(), 1);

    // Orbit переспрашивает каждые 0.4 s
    ticks(&mut app, 40);
    assert!(app.world().resource::<AttackDirector>().holds(waiting));
    assert_eq!(state(&app, waiting), Some(StateId::Engage));
}

// ============================================================================
// Perception
// ============================================================================

#[test]
fn test_agent_hears_shot_behind_its_back() {
    let mut app = test_app(42);
    spawn_player(&mut app, Vec2::ZERO);
    // Игрок в 5 м за спиной: в sight_range, но вне конуса
    let rusher = spawn(&mut app, stats("Grunt"), Archetype::Rusher, Vec2::new(0.0, 5.0), Vec2::new(0.0, 10.0));

    ticks(&mut app, 30);
    assert_eq!(state(&app, rusher), Some(StateId::Idle));

    app.world_mut().send_event(WeaponFired {
        shooter: None,
        position: Vec2::ZERO,
        noise_radius: 20.0,
    });
    ticks(&mut app, 2);

    assert_eq!(state(&app, rusher), Some(StateId::Chase));
    let perception = app.world().get::<Perception>(rusher).unwrap();
    assert!(perception.has_target());
    assert_eq!(perception.last_known_position(), Vec2::ZERO);
}

// ============================================================================
// Melee
// ============================================================================

#[test]
fn test_rusher_melee_reaches_the_player() {
    let mut app = test_app(42);
    let player = spawn_player(&mut app, Vec2::ZERO);
    let rusher = spawn(&mut app, stats("Grunt"), Archetype::Rusher, Vec2::new(0.0, 4.0), Vec2::ZERO);

    // Дойти (3 u/s) + телеграф 0.4 s
    ticks(&mut app, 150);

    let strikes = intents_of(&app, rusher)
        .into_iter()
        .filter(|i| matches!(i, AgentIntent::MeleeStrike { .. }))
        .count();
    assert!(strikes >= 1, "rusher never swung");

    let hits: Vec<DamageRequest> = events::<DamageRequest>(&app)
        .into_iter()
        .filter(|r| r.target == player)
        .collect();
    assert!(!hits.is_empty(), "melee hitbox never reached the player");
    assert_eq!(hits[0].source, Some(rusher));
    assert_eq!(hits[0].amount, 10.0);
}

#[test]
fn test_same_faction_is_not_hit_by_melee() {
    let mut app = test_app(42);
    spawn_player(&mut app, Vec2::ZERO);
    let first = spawn(&mut app, stats("Grunt"), Archetype::Rusher, Vec2::new(1.0, 0.0), Vec2::ZERO);
    let second = spawn(&mut app, stats("Grunt"), Archetype::Rusher, Vec2::new(1.2, 0.8), Vec2::ZERO);

    ticks(&mut app, 120);

    assert_eq!(body(&app, first).health(), 100.0);
    assert_eq!(body(&app, second).health(), 100.0);
    assert!(events::<AttackLanded>(&app).iter().all(|l| l.target != first && l.target != second));
}

// ============================================================================
// Boss phases
// ============================================================================

#[test]
fn test_boss_phase_transition_is_invulnerable_and_timed() {
    let mut app = test_app(42);
    let boss_stats = EnemyStats {
        max_poise: 0.0,
        ..stats("Warden")
    };
    let boss = spawn_agent(
        app.world_mut(),
        AgentSpawn::new(Arc::new(boss_stats), Archetype::Rusher).boss(vec![BossPhase {
            name: "Enraged".to_string(),
            hp_threshold: 0.5,
            damage_multiplier: 2.0,
            transition_duration: 1.0,
            ..Default::default()
        }]),
    );

    step(&mut app, DT);
    assert_eq!(state(&app, boss), Some(StateId::Idle));

    damage(&mut app, boss, 60.0);
    step(&mut app, DT);

    assert_eq!(state(&app, boss), Some(StateId::PhaseTransition));
    assert!(body(&app, boss).is_invulnerable());
    assert_eq!(body(&app, boss).damage_multiplier(), 2.0);

    let phases = events::<PhaseChanged>(&app);
    assert_eq!(phases.len(), 1);
    assert_eq!(phases[0].index, 0);
    assert_eq!(phases[0].phase, "Enraged");

    // Неуязвим во время перехода
    damage(&mut app, boss, 30.0);
    step(&mut app, DT);
    assert_eq!(body(&app, boss).health(), 40.0);

    ticks(&mut app, 65);
    assert_eq!(state(&app, boss), Some(StateId::Idle));
    assert!(!body(&app, boss).is_invulnerable());
    assert_eq!(app.world().get::<BossController>(boss).unwrap().current_phase(), 0);

    // Фаза срабатывает один раз
    damage(&mut app, boss, 10.0);
    step(&mut app, DT);
    assert_eq!(events::<PhaseChanged>(&app).len(), 1);
    assert_eq!(body(&app, boss).health(), 30.0);
}

fn spawn_boss(app: &mut App, max_poise: f32, phases: Vec<BossPhase>) -> Entity {
    let boss_stats = EnemyStats {
        max_poise,
        ..stats("Warden")
    };
    spawn_agent(
        app.world_mut(),
        AgentSpawn::new(Arc::new(boss_stats), Archetype::Rusher).boss(phases),
    )
}

fn boss_phase(name: &str, hp_threshold: f32) -> BossPhase {
    BossPhase {
        name: name.to_string(),
        hp_threshold,
        transition_duration: 0.5,
        ..Default::default()
    }
}

#[test]
fn test_second_hit_in_same_tick_hits_phase_invulnerability() {
    let mut app = test_app(42);
    let boss = spawn_boss(&mut app, 0.0, vec![boss_phase("Enraged", 0.5)]);
    step(&mut app, DT);

    damage(&mut app, boss, 45.0);
    step(&mut app, DT);
    assert_eq!(body(&app, boss).health(), 55.0);
    assert_eq!(state(&app, boss), Some(StateId::Idle));

    // Первый удар пересекает порог, второй приходит уже в неуязвимость
    damage(&mut app, boss, 30.0);
    damage(&mut app, boss, 30.0);
    step(&mut app, DT);

    assert!(body(&app, boss).is_alive());
    assert_eq!(body(&app, boss).health(), 25.0);
    assert_eq!(state(&app, boss), Some(StateId::PhaseTransition));
    assert_eq!(events::<PhaseChanged>(&app).len(), 1);
    let taken = events::<DamageTaken>(&app)
        .into_iter()
        .filter(|t| t.entity == boss)
        .count();
    assert_eq!(taken, 2);
}

#[test]
fn test_huge_hit_crosses_only_the_first_of_three_phases() {
    let mut app = test_app(42);
    let boss = spawn_boss(
        &mut app,
        0.0,
        vec![boss_phase("Angry", 0.75), boss_phase("Furious", 0.5), boss_phase("Desperate", 0.25)],
    );
    step(&mut app, DT);

    // 1.0 → 0.1 одним ударом
    damage(&mut app, boss, 90.0);
    step(&mut app, DT);

    let phases = events::<PhaseChanged>(&app);
    assert_eq!(phases.len(), 1);
    assert_eq!(phases[0].index, 0);
    assert_eq!(phases[0].phase, "Angry");
    assert_eq!(state(&app, boss), Some(StateId::PhaseTransition));

    // Переход закончился, но без нового урона следующая фаза не стартует
    ticks(&mut app, 40);
    assert_eq!(state(&app, boss), Some(StateId::Idle));
    assert_eq!(events::<PhaseChanged>(&app).len(), 1);
    assert_eq!(app.world().get::<BossController>(boss).unwrap().current_phase(), 0);

    damage(&mut app, boss, 1.0);
    step(&mut app, DT);

    let phases = events::<PhaseChanged>(&app);
    assert_eq!(phases.len(), 2);
    assert_eq!(phases[1].index, 1);
    assert_eq!(body(&app, boss).health(), 9.0);
}

#[test]
fn test_phase_change_during_stagger_clears_poise_break() {
    let mut app = test_app(42);
    let boss = spawn_boss(&mut app, 10.0, vec![boss_phase("Enraged", 0.5)]);
    step(&mut app, DT);

    damage(&mut app, boss, 20.0);
    step(&mut app, DT);
    assert_eq!(state(&app, boss), Some(StateId::Stagger));

    // Фаза вытесняет Stagger
    damage(&mut app, boss, 40.0);
    step(&mut app, DT);
    assert_eq!(state(&app, boss), Some(StateId::PhaseTransition));
    assert!(!body(&app, boss).is_staggered());
    assert_eq!(body(&app, boss).poise(), body(&app, boss).max_poise());

    ticks(&mut app, 40);
    assert_eq!(state(&app, boss), Some(StateId::Idle));
}

// ============================================================================
// Poise / SuperArmor
// ============================================================================

#[test]
fn test_poise_break_staggers_unless_super_armor() {
    let mut app = test_app(42);
    let plain = spawn(&mut app, stats("Grunt"), Archetype::Rusher, Vec2::new(10.0, 0.0), Vec2::ZERO);
    let armored = spawn(
        &mut app,
        EnemyStats {
            behavior_tags: vec!["SuperArmor".to_string()],
            ..stats("Brute")
        },
        Archetype::Rusher,
        Vec2::new(-10.0, 0.0),
        Vec2::ZERO,
    );

    step(&mut app, DT);
    damage(&mut app, plain, 60.0);
    damage(&mut app, armored, 60.0);
    step(&mut app, DT);

    assert_eq!(events::<PoiseBroken>(&app).len(), 2);

    assert_eq!(state(&app, plain), Some(StateId::Stagger));
    assert!(body(&app, plain).is_staggered());

    assert_eq!(state(&app, armored), Some(StateId::Idle));
    assert!(!body(&app, armored).is_staggered());
    assert_eq!(body(&app, armored).poise(), body(&app, armored).max_poise());

    // stagger_duration = 1 s → poise восстанавливается
    ticks(&mut app, 62);
    assert_ne!(state(&app, plain), Some(StateId::Stagger));
    assert!(!body(&app, plain).is_staggered());
}

// ============================================================================
// Fear
// ============================================================================

#[test]
fn test_ally_death_makes_nearby_ally_flee() {
    let mut app = test_app(42);
    let scared = EnemyStats {
        fear_from_ally_death: 60.0,
        ..stats("Coward")
    };
    let victim = spawn(&mut app, stats("Grunt"), Archetype::Rusher, Vec2::new(0.0, 0.0), Vec2::Y);
    let witness = spawn(&mut app, scared.clone(), Archetype::Rusher, Vec2::new(3.0, 0.0), Vec2::Y);
    let stranger = spawn_agent(
        app.world_mut(),
        AgentSpawn::new(Arc::new(scared), Archetype::Rusher)
            // Слышит смерть (hearing 15), но никого не видит (sight 10)
            .at(Vec2::new(-12.0, 0.0))
            .faction(2),
    );

    step(&mut app, DT);
    damage(&mut app, victim, 500.0);
    step(&mut app, DT);

    assert_eq!(state(&app, witness), Some(StateId::Flee));
    assert!(app.world().get::<Fear>(witness).unwrap().is_fleeing);

    // Чужая фракция не боится
    assert_eq!(app.world().get::<Fear>(stranger).unwrap().value, 0.0);
    assert_eq!(state(&app, stranger), Some(StateId::Idle));

    // flee_duration = 4 s, дальше Return и флаг снят
    ticks(&mut app, 250);
    assert_ne!(state(&app, witness), Some(StateId::Flee));
    assert!(!app.world().get::<Fear>(witness).unwrap().is_fleeing);
}

// ============================================================================
// Threat reactions
// ============================================================================

fn spawn_projectile(app: &mut App, position: Vec2, velocity: Vec2) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_xyz(position.x, position.y, 0.0),
            Motor {
                velocity,
                ..Default::default()
            },
            Collider::circle(LAYER_PROJECTILE, 0.1),
        ))
        .id()
}

#[test]
fn test_incoming_projectile_triggers_dodge_or_block() {
    let mut app = test_app(42);
    let dodger = spawn(
        &mut app,
        EnemyStats {
            behavior_tags: vec!["CanDodge".to_string()],
            ..stats("Dancer")
        },
        Archetype::Rusher,
        Vec2::ZERO,
        Vec2::Y,
    );
    let blocker = spawn(
        &mut app,
        EnemyStats {
            behavior_tags: vec!["CanBlock".to_string()],
            ..stats("Shieldbearer")
        },
        Archetype::Rusher,
        Vec2::new(0.0, 20.0),
        Vec2::Y,
    );
    spawn_projectile(&mut app, Vec2::new(3.0, 0.0), Vec2::new(-10.0, 0.0));
    spawn_projectile(&mut app, Vec2::new(3.0, 20.0), Vec2::new(-10.0, 0.0));

    ticks(&mut app, 2);

    assert_eq!(state(&app, dodger), Some(StateId::Dodge));
    assert_eq!(state(&app, blocker), Some(StateId::Block));
    assert!(body(&app, blocker).is_blocking());

    // Блок режет урон на block_damage_reduction (70%)
    damage(&mut app, blocker, 10.0);
    step(&mut app, DT);
    assert!((body(&app, blocker).health() - 97.0).abs() < 1e-3);
}

#[test]
fn test_turret_ignores_dodge_tag() {
    let mut app = test_app(42);
    let turret = spawn(
        &mut app,
        EnemyStats {
            behavior_tags: vec!["CanDodge".to_string()],
            ..stats("Sentry")
        },
        Archetype::Turret,
        Vec2::ZERO,
        Vec2::Y,
    );
    spawn_projectile(&mut app, Vec2::new(3.0, 0.0), Vec2::new(-10.0, 0.0));

    ticks(&mut app, 2);
    assert_eq!(state(&app, turret), Some(StateId::Scan));
}

// ============================================================================
// Rules
// ============================================================================

#[test]
fn test_stat_block_rule_overrides_state_logic() {
    let mut app = test_app(42);
    let rusher = spawn(
        &mut app,
        EnemyStats {
            max_poise: 0.0,
            transition_rules: vec![TransitionRule {
                condition: RuleCondition::HealthBelow,
                threshold: 0.5,
                priority: 1,
                target: StateId::Flee,
            }],
            ..stats("Skittish")
        },
        Archetype::Rusher,
        Vec2::ZERO,
        Vec2::Y,
    );

    step(&mut app, DT);
    damage(&mut app, rusher, 40.0);
    ticks(&mut app, 2);
    assert_eq!(state(&app, rusher), Some(StateId::Idle));

    damage(&mut app, rusher, 20.0);
    ticks(&mut app, 2);
    assert_eq!(state(&app, rusher), Some(StateId::Flee));
}

// ============================================================================
// Pool hooks
// ============================================================================

#[test]
fn test_release_clears_hooks_and_acquire_rebuilds() {
    let mut app = test_app(42);
    spawn_player(&mut app, Vec2::ZERO);
    let agent = spawn_agent(
        app.world_mut(),
        AgentSpawn::new(Arc::new(stats("Grunt")), Archetype::Rusher)
            .at(Vec2::new(1.0, 0.0))
            .facing(Vec2::NEG_X)
            .affix(AffixDef {
                name: "Regenerating".to_string(),
                effect: AffixEffect::ShieldRegen,
                effect_value: 5.0,
                ..Default::default()
            }),
    );
    assert_eq!(app.world().get::<AffixSet>(agent).unwrap().hook_count(), 1);

    ticks(&mut app, 3);
    assert!(app.world().resource::<AttackDirector>().holds(agent));

    release_agent(app.world_mut(), agent).unwrap();
    step(&mut app, DT);

    assert_eq!(app.world().get::<AffixSet>(agent).unwrap().hook_count(), 0);
    assert!(app.world().get::<Brain>(agent).unwrap().is_released());
    assert!(!app.world().resource::<AttackDirector>().holds(agent));
    assert!(!app.world().get::<Collider>(agent).unwrap().enabled);

    // Пока в pool: не думает
    ticks(&mut app, 10);
    assert_eq!(state(&app, agent), None);

    acquire_agent(app.world_mut(), agent, Vec2::new(8.0, 8.0)).unwrap();
    step(&mut app, DT);

    assert_eq!(app.world().get::<AffixSet>(agent).unwrap().hook_count(), 1);
    assert_eq!(body(&app, agent).health(), 100.0);
    assert!(app.world().get::<Collider>(agent).unwrap().enabled);
    assert!(app.world().get::<Brain>(agent).unwrap().has_graph());
    assert_eq!(state(&app, agent), Some(StateId::Idle));
}

#[test]
fn test_acquire_rejects_bad_entities() {
    let mut app = test_app(42);
    let plain = app.world_mut().spawn(Transform::default()).id();

    assert!(matches!(
        acquire_agent(app.world_mut(), plain, Vec2::ZERO),
        Err(AgentSetupError::MissingBody(_))
    ));

    app.world_mut().despawn(plain);
    assert!(matches!(
        release_agent(app.world_mut(), plain),
        Err(AgentSetupError::MissingEntity(_))
    ));
}

#[test]
fn test_unconfigured_agent_is_disabled() {
    let mut app = test_app(42);
    let agent = spawn_agent(app.world_mut(), AgentSpawn::unconfigured(Archetype::Rusher));

    assert!(app.world().get::<AiDisabled>(agent).is_some());
    ticks(&mut app, 5);
    assert_eq!(state(&app, agent), None);
}

// ============================================================================
// Archetypes
// ============================================================================

#[test]
fn test_turret_scan_lock_fire_cooldown() {
    let mut app = test_app(42);
    spawn_player(&mut app, Vec2::new(0.0, -5.0));
    let turret = spawn(
        &mut app,
        EnemyStats {
            turret: TurretParams {
                lock_on_duration: 0.5,
                ..Default::default()
            },
            attacks: vec![AttackPattern {
                name: "Beam".to_string(),
                kind: AttackKind::Laser,
                laser_duration: 0.5,
                ..Default::default()
            }],
            ..stats("Sentry")
        },
        Archetype::Turret,
        Vec2::ZERO,
        Vec2::new(0.0, -5.0),
    );

    ticks(&mut app, 2);
    assert_eq!(state(&app, turret), Some(StateId::Lock));

    // lock 0.5 s
    ticks(&mut app, 32);
    assert_eq!(state(&app, turret), Some(StateId::Attack));

    let lasers: Vec<AgentIntent> = intents_of(&app, turret)
        .into_iter()
        .filter(|i| matches!(i, AgentIntent::FireLaser { .. }))
        .collect();
    assert_eq!(lasers.len(), 1);
    if let AgentIntent::FireLaser { direction, .. } = &lasers[0] {
        assert!(direction.dot(Vec2::NEG_Y) > 0.99);
    }

    // окно лазера 0.5 + 0.15
    ticks(&mut app, 45);
    assert_eq!(state(&app, turret), Some(StateId::Cooldown));
    assert!(!app.world().resource::<AttackDirector>().holds(turret));
}

#[test]
fn test_shooter_fires_a_full_burst() {
    let mut app = test_app(42);
    spawn_player(&mut app, Vec2::ZERO);
    let shooter = spawn(&mut app, stats("Gunner"), Archetype::Shooter, Vec2::new(0.0, 8.0), Vec2::ZERO);

    // build → Idle → Chase → Shoot, телеграф 0.4 s, 3 выстрела по 0.25 s
    ticks(&mut app, 90);

    let shots = intents_of(&app, shooter)
        .into_iter()
        .filter(|i| matches!(i, AgentIntent::FireProjectile { .. }))
        .count();
    assert_eq!(shots, 3);
}

#[test]
fn test_stalker_strikes_from_behind() {
    let mut app = test_app(42);
    // Игрок смотрит вниз (-Y), stalker сзади (+Y)
    let player = spawn_player(&mut app, Vec2::ZERO);
    let stalker = spawn(&mut app, stats("Shade"), Archetype::Stalker, Vec2::new(0.0, 1.0), Vec2::ZERO);

    ticks(&mut app, 3);
    assert_eq!(state(&app, stalker), Some(StateId::Strike));

    // reveal 0.2 s + commit 0.15 s
    ticks(&mut app, 25);
    assert_eq!(state(&app, stalker), Some(StateId::Disengage));

    let intents = intents_of(&app, stalker);
    assert!(intents
        .iter()
        .any(|i| matches!(i, AgentIntent::SetAlpha { alpha, .. } if (*alpha - 0.1).abs() < 1e-3)));
    assert!(intents.iter().any(|i| matches!(i, AgentIntent::MeleeStrike { .. })));
    assert!(events::<DamageRequest>(&app).iter().any(|r| r.target == player));
    assert!(!app.world().resource::<AttackDirector>().holds(stalker));
}
