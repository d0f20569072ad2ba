//! Pulse simulation: the point grid, the running gate and the listening point.

pub mod point;
pub mod step;

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub use point::Point;
pub use step::{advance, TickOutcome, FLASH_DECAY_MS};

use crate::audio::AudioClip;
use crate::error::ConfigError;
use crate::grid;
use crate::params::{GridParams, SimulationParams};
use crate::scene::{AudioPlayer, SceneNode};

/// Aggregate simulation state, advanced once per frame
pub struct Simulation {
    points: Vec<Point>,
    running: bool,
    last_sim_ms: Option<f64>,
    clip: Option<AudioClip>,
    listener: Vec3,
}

impl Simulation {
    /// Build the grid with a seeded schedule (fresh seed when none is configured)
    pub fn new(grid: &GridParams, params: &SimulationParams) -> Result<Self, ConfigError> {
        let seed = params.seed.unwrap_or_else(rand::random);
        log::info!("Schedule seed: {}", seed);
        Self::with_rng(grid, params, &mut SmallRng::seed_from_u64(seed))
    }

    pub fn with_rng<R: Rng>(
        grid: &GridParams,
        params: &SimulationParams,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        grid.validate()?;
        params.validate()?;

        let points = grid::point_positions(grid)
            .into_iter()
            .map(|position| Point::random(position, params, rng))
            .collect::<Result<_, _>>()?;
        Ok(Self::from_points(points))
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            points,
            running: false,
            last_sim_ms: None,
            clip: None,
            listener: Vec3::ZERO,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Open the trigger gate; returns false if it was already open
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        log::info!("Simulation started");
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_clip(&mut self, clip: AudioClip) {
        self.clip = Some(clip);
    }

    pub fn clip_available(&self) -> bool {
        self.clip.is_some()
    }

    pub fn last_sim_ms(&self) -> Option<f64> {
        self.last_sim_ms
    }

    /// Tick every point to `now_ms`
    pub fn advance(&mut self, now_ms: f64) -> Vec<TickOutcome> {
        let clip_available = self.clip_available();
        let outcomes = step::advance(&mut self.points, now_ms, self.running, clip_available);
        self.last_sim_ms = Some(now_ms);
        outcomes
    }

    /// Tick and hand the results to the collaborators
    ///
    /// Every triggered point gets a voice at its position, and `nodes[i]`
    /// receives point `i`'s flash intensity. Returns the number of triggers.
    pub fn frame<A, N>(&mut self, now_ms: f64, audio: &mut A, nodes: &mut [N]) -> usize
    where
        A: AudioPlayer + ?Sized,
        N: SceneNode,
    {
        let outcomes = self.advance(now_ms);
        let mut triggers = 0;

        for (i, (point, outcome)) in self.points.iter().zip(&outcomes).enumerate() {
            if outcome.triggered {
                if let Some(clip) = &self.clip {
                    log::debug!("Pulse {} at {}", i, point.position());
                    audio.play_at(clip, point.position());
                    triggers += 1;
                }
            }
            if let Some(node) = nodes.get_mut(i) {
                node.set_flash(outcome.flash_intensity);
            }
        }

        triggers
    }

    /// Move the listening point and push it to the audio listener and marker
    pub fn set_listening_point<A, M>(&mut self, position: Vec3, audio: &mut A, marker: &mut M)
    where
        A: AudioPlayer + ?Sized,
        M: SceneNode + ?Sized,
    {
        self.listener = position;
        audio.set_listener_position(position);
        marker.set_position(position);
    }

    pub fn listening_point(&self) -> Vec3 {
        self.listener
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingPlayer {
        plays: Vec<Vec3>,
        listener: Option<Vec3>,
        listener_updates: usize,
    }

    impl AudioPlayer for RecordingPlayer {
        fn play_at(&mut self, _clip: &AudioClip, position: Vec3) {
            self.plays.push(position);
        }

        fn set_listener_position(&mut self, position: Vec3) {
            self.listener = Some(position);
            self.listener_updates += 1;
        }
    }

    #[derive(Default)]
    struct RecordingNode {
        position: Option<Vec3>,
        flash: Option<f32>,
    }

    impl SceneNode for RecordingNode {
        fn set_position(&mut self, position: Vec3) {
            self.position = Some(position);
        }

        fn set_flash(&mut self, intensity: f32) {
            self.flash = Some(intensity);
        }
    }

    fn clip() -> AudioClip {
        AudioClip::from_mono(vec![0.0; 4], 1000).unwrap()
    }

    fn two_points() -> Simulation {
        Simulation::from_points(vec![
            Point::new(Vec3::new(-0.5, 0.0, 0.0), 1000.0, 0.0).unwrap(),
            Point::new(Vec3::new(0.5, 0.0, 0.0), 3000.0, 0.0).unwrap(),
        ])
    }

    #[test]
    fn test_seeded_construction_is_deterministic() {
        let grid = GridParams::default();
        let params = SimulationParams {
            seed: Some(42),
            ..SimulationParams::default()
        };

        let a = Simulation::new(&grid, &params).unwrap();
        let b = Simulation::new(&grid, &params).unwrap();

        assert_eq!(a.points().len(), 25);
        for (pa, pb) in a.points().iter().zip(b.points()) {
            assert_eq!(pa.cycle_period_ms(), pb.cycle_period_ms());
            assert_eq!(pa.phase_offset_ms(), pb.phase_offset_ms());
            assert_eq!(pa.position(), pb.position());
        }
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let grid = GridParams {
            divisions: 0,
            ..GridParams::default()
        };
        assert!(Simulation::new(&grid, &SimulationParams::default()).is_err());

        let params = SimulationParams {
            cycle_period_ms: 0.0..100.0,
            ..SimulationParams::default()
        };
        assert!(Simulation::new(&GridParams::default(), &params).is_err());
    }

    #[test]
    fn test_start_is_one_way() {
        let mut sim = two_points();
        assert!(!sim.is_running());
        assert!(sim.start());
        assert!(!sim.start());
        assert!(sim.is_running());
    }

    #[test]
    fn test_frame_dispatches_triggers_and_flashes() {
        let mut sim = two_points();
        sim.set_clip(clip());
        sim.start();

        let mut audio = RecordingPlayer::default();
        let mut nodes = vec![RecordingNode::default(), RecordingNode::default()];

        assert_eq!(sim.frame(0.0, &mut audio, &mut nodes), 0);
        assert_eq!(sim.frame(500.0, &mut audio, &mut nodes), 0);
        assert_eq!(sim.frame(1000.0, &mut audio, &mut nodes), 1);

        // Only the 1000ms point crossed a boundary
        assert_eq!(audio.plays, vec![Vec3::new(-0.5, 0.0, 0.0)]);
        assert_eq!(nodes[0].flash, Some(0.5)); // stamped at 500, now 1000
        assert_eq!(nodes[1].flash, Some(0.0));
        assert_eq!(sim.last_sim_ms(), Some(1000.0));
    }

    #[test]
    fn test_frame_without_clip_only_ticks() {
        let mut sim = two_points();
        sim.start();

        let mut audio = RecordingPlayer::default();
        let mut nodes = vec![RecordingNode::default(), RecordingNode::default()];

        for now in [0.0, 1000.0, 2000.0, 3000.0] {
            assert_eq!(sim.frame(now, &mut audio, &mut nodes), 0);
        }
        assert!(audio.plays.is_empty());
        assert!(sim.points().iter().all(|p| p.last_tick_ms() == Some(3000.0)));
        assert!(nodes.iter().all(|n| n.flash == Some(0.0)));
    }

    #[test]
    fn test_clip_arriving_late_enables_triggers() {
        let mut sim = two_points();
        sim.start();

        let mut audio = RecordingPlayer::default();
        let mut nodes: Vec<RecordingNode> = Vec::new();

        sim.frame(0.0, &mut audio, &mut nodes);
        sim.frame(1000.0, &mut audio, &mut nodes);
        assert!(audio.plays.is_empty());

        sim.set_clip(clip());
        sim.frame(2000.0, &mut audio, &mut nodes);
        assert_eq!(audio.plays.len(), 1);
    }

    #[test]
    fn test_set_listening_point_is_idempotent() {
        let mut sim = two_points();
        let mut audio = RecordingPlayer::default();
        let mut marker = RecordingNode::default();
        let target = Vec3::new(0.1, 0.0, -0.3);

        sim.set_listening_point(target, &mut audio, &mut marker);
        let points_before: Vec<_> = sim.points().iter().map(|p| p.last_tick_ms()).collect();
        sim.set_listening_point(target, &mut audio, &mut marker);

        assert_eq!(sim.listening_point(), target);
        assert_eq!(audio.listener, Some(target));
        assert_eq!(audio.listener_updates, 2);
        assert_eq!(marker.position, Some(target));
        assert!(audio.plays.is_empty());
        let points_after: Vec<_> = sim.points().iter().map(|p| p.last_tick_ms()).collect();
        assert_eq!(points_before, points_after);
    }
}
