//! Fixed timestep simulation tick
//!
//! One tick runs every update of an active session in a fixed order:
//! keys, ship motion, meteor fall, collision, then the periodic clocks
//! (creep, spawn, score). The clocks are tick counters owned by the session,
//! so they stop the moment the session ends and start from zero on restart.

use super::collision::first_overlap;
use super::state::{Control, Session};
use crate::settings::Settings;

/// Edge-triggered key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(Control),
    Up(Control),
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Start / restart request (button, Enter, Space)
    pub start: bool,
    /// Key transitions since the previous tick, in arrival order
    pub keys: Vec<KeyEvent>,
}

/// Things that happened during a tick, for the shell to log and display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Started,
    ObstaclesSpawned { count: u32 },
    ScoreChanged { score: u64 },
    BatchGrew { batch_size: u32 },
    Collision { obstacle_index: usize },
    GameOver { score: u64 },
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut Session, input: &TickInput, settings: &Settings) -> Vec<SessionEvent> {
    let mut events = Vec::new();

    if input.start && session.start(settings) {
        events.push(SessionEvent::Started);
    }

    for key in &input.keys {
        apply_key(session, *key);
    }

    // Nothing moves outside of play
    if !session.is_active() {
        return events;
    }

    session.time_ticks += 1;

    move_ship(session, settings);
    advance_obstacles(session, settings);

    if let Some(obstacle_index) = check_collisions(session, settings) {
        let score = session.score;
        session.finish();
        events.push(SessionEvent::Collision { obstacle_index });
        events.push(SessionEvent::GameOver { score });
        return events;
    }

    if session.timers.creep.advance() {
        creep_obstacles(session, settings);
    }

    if session.timers.spawn.advance() {
        let count = spawn_batch(session, settings);
        events.push(SessionEvent::ObstaclesSpawned { count });
    }

    if session.timers.score.advance() {
        add_point(session, settings, &mut events);
    }

    events
}

/// Apply a key transition. Presses only register during play; releases always do.
pub fn apply_key(session: &mut Session, key: KeyEvent) {
    match key {
        KeyEvent::Down(control) => {
            if session.is_active() {
                session.input.set(control, true);
            }
        }
        KeyEvent::Up(control) => session.input.set(control, false),
    }
}

/// Step the ship toward any held direction.
///
/// Both guards read the position from before the step, and there is no clamp:
/// a ship within one step of a wall can finish up to one step past it.
pub fn move_ship(session: &mut Session, settings: &Settings) {
    let x = session.ship_x;
    let mut next = x;
    if session.input.left && x > 0.0 {
        next -= settings.ship_step;
    }
    if session.input.right && x < settings.ship_max_x() {
        next += settings.ship_step;
    }
    session.ship_x = next;
}

/// Drop every meteor one step, then discard those that reached the bottom
pub fn advance_obstacles(session: &mut Session, settings: &Settings) {
    for obstacle in &mut session.obstacles {
        obstacle.pos.y += settings.obstacle_step;
    }
    let height = settings.container_height;
    session.obstacles.retain(|o| o.pos.y < height);
}

/// Slow difficulty creep: an extra nudge for every meteor on screen
pub fn creep_obstacles(session: &mut Session, settings: &Settings) {
    for obstacle in &mut session.obstacles {
        obstacle.pos.y += settings.creep_step;
    }
}

/// Spawn one batch of meteors; returns how many were created
pub fn spawn_batch(session: &mut Session, settings: &Settings) -> u32 {
    let count = session.batch_size;
    for _ in 0..count {
        session.spawn_obstacle(settings);
    }
    log::debug!(
        "Spawned {} meteor(s), {} on screen",
        count,
        session.obstacles.len()
    );
    count
}

/// Index of the first meteor touching the ship, if any
pub fn check_collisions(session: &Session, settings: &Settings) -> Option<usize> {
    let ship = session.ship_rect(settings);
    let size = settings.obstacle_size;
    first_overlap(&ship, session.obstacles.iter().map(|o| o.rect(size)))
}

/// Score one point, growing the batch size on every threshold multiple
pub fn add_point(session: &mut Session, settings: &Settings, events: &mut Vec<SessionEvent>) {
    session.score += 1;
    events.push(SessionEvent::ScoreChanged {
        score: session.score,
    });

    if session.score % settings.batch_score_threshold == 0 {
        session.batch_size += 1;
        log::info!(
            "Score {}: batch size now {}",
            session.score,
            session.batch_size
        );
        events.push(SessionEvent::BatchGrew {
            batch_size: session.batch_size,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{InputState, Obstacle, SessionPhase};
    use proptest::prelude::*;

    fn started(settings: &Settings) -> Session {
        let mut session = Session::new(12345, settings);
        session.start(settings);
        session
    }

    /// Remove meteors in the ship's column so long runs can't end early
    fn clear_ship_lane(session: &mut Session, settings: &Settings) {
        let ship = session.ship_rect(settings);
        let size = settings.obstacle_size;
        session
            .obstacles
            .retain(|o| o.pos.x + size <= ship.left || o.pos.x >= ship.right);
    }

    fn press(control: Control) -> TickInput {
        TickInput {
            keys: vec![KeyEvent::Down(control)],
            ..Default::default()
        }
    }

    #[test]
    fn test_tick_not_started_is_noop() {
        let settings = Settings::default();
        let mut session = Session::new(1, &settings);
        for _ in 0..200 {
            let events = tick(&mut session, &TickInput::default(), &settings);
            assert!(events.is_empty());
        }
        assert_eq!(session.phase, SessionPhase::NotStarted);
        assert_eq!(session.score, 0);
        assert!(session.obstacles.is_empty());
        assert_eq!(session.time_ticks, 0);
    }

    #[test]
    fn test_tick_start() {
        let settings = Settings::default();
        let mut session = Session::new(1, &settings);
        let input = TickInput {
            start: true,
            ..Default::default()
        };
        let events = tick(&mut session, &input, &settings);
        assert_eq!(events, vec![SessionEvent::Started]);
        assert!(session.is_active());
        assert_eq!(session.time_ticks, 1);
    }

    #[test]
    fn test_ten_seconds_idle() {
        let settings = Settings::default();
        let mut session = started(&settings);
        let input = TickInput::default();

        for _ in 0..600 {
            tick(&mut session, &input, &settings);
            clear_ship_lane(&mut session, &settings);
        }

        assert!(session.is_active());
        assert_eq!(session.score, 10);
        assert_eq!(session.batch_size, 2);
        assert_eq!(session.ship_x, 180.0);
    }

    #[test]
    fn test_score_once_per_second() {
        let settings = Settings::default();
        let mut session = started(&settings);
        let input = TickInput::default();

        for second in 1..=5u64 {
            for _ in 0..59 {
                tick(&mut session, &input, &settings);
                clear_ship_lane(&mut session, &settings);
            }
            assert_eq!(session.score, second - 1);
            let events = tick(&mut session, &input, &settings);
            clear_ship_lane(&mut session, &settings);
            assert!(events.contains(&SessionEvent::ScoreChanged { score: second }));
            assert_eq!(session.score, second);
        }
    }

    #[test]
    fn test_spawn_every_one_and_a_half_seconds() {
        let settings = Settings::default();
        let mut session = started(&settings);
        let input = TickInput::default();

        for _ in 0..89 {
            tick(&mut session, &input, &settings);
        }
        assert!(session.obstacles.is_empty());

        let events = tick(&mut session, &input, &settings);
        assert!(events.contains(&SessionEvent::ObstaclesSpawned { count: 1 }));
        assert_eq!(session.obstacles.len(), 1);
        assert_eq!(session.obstacles[0].pos.y, -50.0);
    }

    #[test]
    fn test_spawn_uses_batch_size() {
        let settings = Settings::default();
        let mut session = started(&settings);
        session.batch_size = 4;
        assert_eq!(spawn_batch(&mut session, &settings), 4);
        assert_eq!(session.obstacles.len(), 4);
    }

    #[test]
    fn test_batch_grows_on_each_threshold() {
        let settings = Settings::default();
        let mut session = started(&settings);
        let mut events = Vec::new();

        for score in 1..=35u64 {
            add_point(&mut session, &settings, &mut events);
            assert_eq!(session.batch_size as u64, 1 + score / 10);
        }
        let grew: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::BatchGrew { .. }))
            .collect();
        assert_eq!(grew.len(), 3);
    }

    #[test]
    fn test_move_left_and_right() {
        let settings = Settings::default();
        let mut session = started(&settings);

        tick(&mut session, &press(Control::Left), &settings);
        assert_eq!(session.ship_x, 175.0);
        tick(&mut session, &TickInput::default(), &settings);
        assert_eq!(session.ship_x, 170.0);

        let release = TickInput {
            keys: vec![KeyEvent::Up(Control::Left), KeyEvent::Down(Control::Right)],
            ..Default::default()
        };
        tick(&mut session, &release, &settings);
        assert_eq!(session.ship_x, 175.0);
    }

    #[test]
    fn test_both_directions_cancel() {
        let settings = Settings::default();
        let mut session = started(&settings);
        session.input = InputState {
            left: true,
            right: true,
        };
        move_ship(&mut session, &settings);
        assert_eq!(session.ship_x, 180.0);
    }

    #[test]
    fn test_ship_stops_at_walls() {
        let settings = Settings::default();
        let mut session = started(&settings);

        session.input.left = true;
        for _ in 0..100 {
            move_ship(&mut session, &settings);
        }
        assert_eq!(session.ship_x, 0.0);

        session.input = InputState {
            left: false,
            right: true,
        };
        for _ in 0..100 {
            move_ship(&mut session, &settings);
        }
        assert_eq!(session.ship_x, 360.0);
    }

    #[test]
    fn test_ship_may_overshoot_by_less_than_a_step() {
        let settings = Settings::default().with_container(403.0, 600.0);
        let mut session = started(&settings);
        session.input.right = true;
        for _ in 0..100 {
            move_ship(&mut session, &settings);
        }
        // 360 < 363 allows one more step
        assert_eq!(session.ship_x, 365.0);
        assert!(session.ship_x - settings.ship_max_x() < settings.ship_step);
    }

    #[test]
    fn test_key_down_ignored_unless_active() {
        let settings = Settings::default();
        let mut session = Session::new(1, &settings);
        apply_key(&mut session, KeyEvent::Down(Control::Left));
        assert!(!session.input.left);

        session.start(&settings);
        session.finish();
        apply_key(&mut session, KeyEvent::Down(Control::Right));
        assert!(!session.input.right);
    }

    #[test]
    fn test_key_up_always_releases() {
        let settings = Settings::default();
        let mut session = started(&settings);
        session.phase = SessionPhase::GameOver;
        session.input = InputState {
            left: true,
            right: true,
        };
        apply_key(&mut session, KeyEvent::Up(Control::Left));
        assert!(!session.input.left);
        assert!(session.input.right);
    }

    #[test]
    fn test_advance_and_despawn() {
        let settings = Settings::default();
        let mut session = started(&settings);
        session.obstacles = vec![
            Obstacle::new(0.0, 598.0),
            Obstacle::new(100.0, 596.0),
            Obstacle::new(200.0, -50.0),
        ];
        advance_obstacles(&mut session, &settings);
        assert_eq!(
            session.obstacles,
            vec![Obstacle::new(100.0, 599.0), Obstacle::new(200.0, -47.0)]
        );
    }

    #[test]
    fn test_creep_every_three_seconds() {
        let settings = Settings::default();
        let mut session = started(&settings);
        session.obstacles.push(Obstacle::new(0.0, -1000.0));
        let input = TickInput::default();

        for _ in 0..180 {
            tick(&mut session, &input, &settings);
        }
        // 180 regular steps plus one creep nudge
        let y = session.obstacles[0].pos.y;
        assert!((y - (-1000.0 + 180.0 * 3.0 + 0.1)).abs() < 1e-3);
    }

    #[test]
    fn test_creep_disabled() {
        let settings = Settings {
            creep_step: 0.0,
            ..Default::default()
        };
        let mut session = started(&settings);
        session.obstacles.push(Obstacle::new(0.0, 10.0));
        creep_obstacles(&mut session, &settings);
        assert_eq!(session.obstacles[0].pos.y, 10.0);
    }

    #[test]
    fn test_collision_ends_session() {
        let settings = Settings::default();
        let mut session = started(&settings);
        session.ship_x = 0.0;
        session.input.left = true;
        // One step above the ship's box; advancing moves it into overlap
        session.obstacles = vec![
            Obstacle::new(100.0, 300.0),
            Obstacle::new(10.0, 507.0),
        ];

        let events = tick(&mut session, &TickInput::default(), &settings);
        assert_eq!(
            events,
            vec![
                SessionEvent::Collision { obstacle_index: 1 },
                SessionEvent::GameOver { score: 0 },
            ]
        );
        assert!(session.is_over());
        assert_eq!(session.input, InputState::default());
    }

    #[test]
    fn test_nothing_changes_after_game_over() {
        let settings = Settings::default();
        let mut session = started(&settings);
        session.score = 7;
        session.obstacles.push(Obstacle::new(0.0, 0.0));
        session.finish();

        for _ in 0..300 {
            tick(&mut session, &press(Control::Left), &settings);
        }
        assert_eq!(session.score, 7);
        assert_eq!(session.obstacles, vec![Obstacle::new(0.0, 0.0)]);
        assert_eq!(session.ship_x, 180.0);
        assert!(!session.input.left);
    }

    #[test]
    fn test_restart_after_game_over() {
        let settings = Settings::default();
        let mut session = started(&settings);
        session.ship_x = 40.0;
        session.score = 12;
        session.batch_size = 2;
        session.obstacles.push(Obstacle::new(5.0, 5.0));
        session.finish();

        let input = TickInput {
            start: true,
            ..Default::default()
        };
        let events = tick(&mut session, &input, &settings);
        assert_eq!(events[0], SessionEvent::Started);
        assert_eq!(session.phase, SessionPhase::Active);
        assert!(!session.is_over());
        assert_eq!(session.score, 0);
        assert_eq!(session.batch_size, 1);
        assert_eq!(session.ship_x, 180.0);
        assert!(session.obstacles.is_empty());
    }

    #[test]
    fn test_determinism() {
        let settings = Settings::default();
        let mut a = started(&settings);
        let mut b = started(&settings);
        let inputs = [
            press(Control::Left),
            TickInput::default(),
            press(Control::Right),
        ];
        for i in 0..900 {
            let input = &inputs[i % inputs.len()];
            let ea = tick(&mut a, input, &settings);
            let eb = tick(&mut b, input, &settings);
            assert_eq!(ea, eb);
        }
        assert_eq!(a.obstacles, b.obstacles);
        assert_eq!(a.ship_x, b.ship_x);
        assert_eq!(a.score, b.score);
    }

    fn key_strategy() -> impl Strategy<Value = Option<KeyEvent>> {
        prop_oneof![
            4 => Just(None),
            1 => (any::<bool>(), any::<bool>()).prop_map(|(left, down)| {
                let control = if left { Control::Left } else { Control::Right };
                Some(if down {
                    KeyEvent::Down(control)
                } else {
                    KeyEvent::Up(control)
                })
            }),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_session_invariants(
            seed in any::<u64>(),
            steps in prop::collection::vec((key_strategy(), prop::bool::weighted(0.01)), 1..1500),
        ) {
            let settings = Settings::default();
            let mut session = Session::new(seed, &settings);
            session.start(&settings);
            let step = settings.ship_step;
            let score_period = settings.score_period_ticks() as u64;
            let mut last_score = 0;

            for (key, start) in steps {
                let input = TickInput {
                    start,
                    keys: key.into_iter().collect(),
                };
                let restarted = tick(&mut session, &input, &settings).contains(&SessionEvent::Started);
                if restarted {
                    last_score = 0;
                }

                prop_assert_eq!(session.batch_size as u64, 1 + session.score / 10);
                prop_assert!(session.score >= last_score);
                last_score = session.score;

                if session.is_active() {
                    prop_assert!(session.ship_x >= -step);
                    prop_assert!(session.ship_x <= settings.ship_max_x() + step);
                    prop_assert_eq!(session.score, session.time_ticks / score_period);
                    prop_assert!(session.obstacles.iter().all(|o| o.pos.y < settings.container_height));
                    // Every meteor falls by the same amounts, so older ones are always lower
                    prop_assert!(session.obstacles.windows(2).all(|w| w[0].pos.y >= w[1].pos.y));
                    prop_assert!(check_collisions(&session, &settings).is_none());
                } else {
                    prop_assert_eq!(session.input, InputState::default());
                }
            }
        }
    }
}
