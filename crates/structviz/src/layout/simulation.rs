//! Velocity Verlet force simulation for graph layouts.
//!
//! The simulation is stepped by the caller, one tick at a time. Every tick
//! decays `alpha` towards `alpha_target`, applies the forces in a fixed order
//! (links, many-body charge, centering, collision, x/y pull) and integrates
//! velocities into positions. Once `alpha` drops below `alpha_min` the
//! simulation stops until it is restarted, for example by a drag.

use std::f32::consts::PI;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;

use structviz_core::geometry::Point;

use crate::config::GraphConfig;

/// Initial spacing of the phyllotaxis spiral.
const INITIAL_RADIUS: f32 = 10.0;

/// Maximum distance a new node is nudged off the spiral.
const INITIAL_JITTER: f32 = 1.0;

/// A simulated node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Fixed x position while the node is pinned.
    pub fx: Option<f32>,
    /// Fixed y position while the node is pinned.
    pub fy: Option<f32>,
}

impl Particle {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }
}

/// A spring between two particles.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spring {
    source: usize,
    target: usize,
    strength: f32,
    /// Share of the correction applied to the target.
    bias: f32,
}

/// Force simulation state.
#[derive(Debug, Clone)]
pub struct Simulation {
    particles: Vec<Particle>,
    springs: Vec<Spring>,
    center: Point,

    alpha: f32,
    alpha_min: f32,
    alpha_decay: f32,
    alpha_target: f32,
    velocity_decay: f32,

    link_distance: f32,
    charge_strength: f32,
    collide_radius: f32,
    center_pull: f32,

    running: bool,
    ticks: usize,
    rng: StdRng,
}

impl Simulation {
    /// Creates a running simulation of `node_count` particles joined by
    /// `links` (pairs of particle indices), placed on a spiral around
    /// `center`.
    ///
    /// Particles are seeded from `config.seed` when present, otherwise from
    /// the thread-local generator.
    pub fn new(
        node_count: usize,
        links: &[(usize, usize)],
        center: Point,
        config: &GraphConfig,
    ) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let golden_angle = PI * (3.0 - 5f32.sqrt());
        let particles = (0..node_count)
            .map(|i| {
                let radius = INITIAL_RADIUS * (0.5 + i as f32).sqrt();
                let angle = i as f32 * golden_angle;
                Particle {
                    x: center.x()
                        + radius * angle.cos()
                        + rng.random_range(-INITIAL_JITTER..INITIAL_JITTER),
                    y: center.y()
                        + radius * angle.sin()
                        + rng.random_range(-INITIAL_JITTER..INITIAL_JITTER),
                    vx: 0.0,
                    vy: 0.0,
                    fx: None,
                    fy: None,
                }
            })
            .collect();

        let mut degree = vec![0usize; node_count];
        for &(source, target) in links {
            degree[source] += 1;
            degree[target] += 1;
        }
        let springs = links
            .iter()
            .map(|&(source, target)| {
                let (ds, dt) = (degree[source] as f32, degree[target] as f32);
                Spring {
                    source,
                    target,
                    strength: 1.0 / ds.min(dt),
                    bias: ds / (ds + dt),
                }
            })
            .collect();

        Self {
            particles,
            springs,
            center,
            alpha: 1.0,
            alpha_min: config.alpha_min,
            alpha_decay: config.alpha_decay,
            alpha_target: 0.0,
            velocity_decay: config.velocity_decay,
            link_distance: config.link_distance,
            charge_strength: config.charge_strength,
            collide_radius: config.collide_radius,
            center_pull: config.center_pull,
            running: true,
            ticks: 0,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn center(&self) -> Point {
        self.center
    }

    /// Returns `true` while [`Simulation::step`] still advances the simulation.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of ticks applied so far.
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Resumes stepping without touching `alpha`.
    pub fn restart(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn set_alpha_target(&mut self, alpha_target: f32) {
        self.alpha_target = alpha_target;
    }

    /// Moves the point the centering and pull forces aim at.
    pub fn set_center(&mut self, center: Point) {
        self.center = center;
    }

    /// Fixes particle `index` at `position` until [`Simulation::unpin`].
    /// Returns `false` if there is no such particle.
    pub fn pin(&mut self, index: usize, position: Point) -> bool {
        let Some(particle) = self.particles.get_mut(index) else {
            return false;
        };
        particle.fx = Some(position.x());
        particle.fy = Some(position.y());
        true
    }

    pub fn unpin(&mut self, index: usize) -> bool {
        let Some(particle) = self.particles.get_mut(index) else {
            return false;
        };
        particle.fx = None;
        particle.fy = None;
        true
    }

    /// Advances one tick if the simulation is running.
    ///
    /// Returns `true` while the simulation keeps running afterwards.
    pub fn step(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.tick();
        if self.alpha < self.alpha_min {
            self.running = false;
        }
        self.running
    }

    /// Steps until the simulation stops or `max_ticks` steps were taken.
    /// Returns the number of steps taken.
    pub fn settle(&mut self, max_ticks: usize) -> usize {
        let mut taken = 0;
        while taken < max_ticks && self.running {
            self.step();
            taken += 1;
        }
        taken
    }

    /// Applies one tick regardless of whether the simulation is running.
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        let alpha = self.alpha;

        self.apply_links(alpha);
        self.apply_charge(alpha);
        self.apply_center();
        self.apply_collision();
        self.apply_pull(alpha);

        let retain = 1.0 - self.velocity_decay;
        for particle in &mut self.particles {
            match particle.fx {
                Some(fx) => {
                    particle.x = fx;
                    particle.vx = 0.0;
                }
                None => {
                    particle.vx *= retain;
                    particle.x += particle.vx;
                }
            }
            match particle.fy {
                Some(fy) => {
                    particle.y = fy;
                    particle.vy = 0.0;
                }
                None => {
                    particle.vy *= retain;
                    particle.y += particle.vy;
                }
            }
        }
        self.ticks += 1;
    }

    /// A tiny random offset used to separate coincident particles.
    fn jiggle(&mut self) -> f32 {
        (self.rng.random::<f32>() - 0.5) * 1e-6
    }

    fn apply_links(&mut self, alpha: f32) {
        for index in 0..self.springs.len() {
            let spring = self.springs[index];
            let (source, target) = (self.particles[spring.source], self.particles[spring.target]);

            let mut dx = target.x + target.vx - source.x - source.vx;
            let mut dy = target.y + target.vy - source.y - source.vy;
            if dx == 0.0 {
                dx = self.jiggle();
            }
            if dy == 0.0 {
                dy = self.jiggle();
            }
            let distance = dx.hypot(dy);
            let l = (distance - self.link_distance) / distance * alpha * spring.strength;
            dx *= l;
            dy *= l;

            let target = &mut self.particles[spring.target];
            target.vx -= dx * spring.bias;
            target.vy -= dy * spring.bias;
            let source = &mut self.particles[spring.source];
            source.vx += dx * (1.0 - spring.bias);
            source.vy += dy * (1.0 - spring.bias);
        }
    }

    fn apply_charge(&mut self, alpha: f32) {
        let count = self.particles.len();
        for i in 0..count {
            let (xi, yi) = (self.particles[i].x, self.particles[i].y);
            let (mut dvx, mut dvy) = (0.0, 0.0);
            for j in (0..count).filter(|&j| j != i) {
                let mut dx = self.particles[j].x - xi;
                let mut dy = self.particles[j].y - yi;
                let mut l = dx * dx + dy * dy;
                if dx == 0.0 {
                    dx = self.jiggle();
                    l += dx * dx;
                }
                if dy == 0.0 {
                    dy = self.jiggle();
                    l += dy * dy;
                }
                if l < 1.0 {
                    l = l.sqrt();
                }
                let w = self.charge_strength * alpha / l;
                dvx += dx * w;
                dvy += dy * w;
            }
            self.particles[i].vx += dvx;
            self.particles[i].vy += dvy;
        }
    }

    fn apply_center(&mut self) {
        let count = self.particles.len();
        if count == 0 {
            return;
        }
        let (sx, sy) = self
            .particles
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        let shift_x = sx / count as f32 - self.center.x();
        let shift_y = sy / count as f32 - self.center.y();
        for particle in &mut self.particles {
            particle.x -= shift_x;
            particle.y -= shift_y;
        }
    }

    fn apply_collision(&mut self) {
        let radius = self.collide_radius;
        let reach = radius + radius;
        let count = self.particles.len();
        for i in 0..count {
            let xi = self.particles[i].x + self.particles[i].vx;
            let yi = self.particles[i].y + self.particles[i].vy;
            for j in (i + 1)..count {
                let other = self.particles[j];
                let mut dx = xi - other.x - other.vx;
                let mut dy = yi - other.y - other.vy;
                let mut l = dx * dx + dy * dy;
                if l >= reach * reach {
                    continue;
                }
                if dx == 0.0 {
                    dx = self.jiggle();
                    l += dx * dx;
                }
                if dy == 0.0 {
                    dy = self.jiggle();
                    l += dy * dy;
                }
                let distance = l.sqrt();
                let push = (reach - distance) / distance;
                dx *= push;
                dy *= push;

                // Equal radii split the correction evenly.
                self.particles[i].vx += dx * 0.5;
                self.particles[i].vy += dy * 0.5;
                self.particles[j].vx -= dx * 0.5;
                self.particles[j].vy -= dy * 0.5;
            }
        }
    }

    fn apply_pull(&mut self, alpha: f32) {
        let strength = self.center_pull * alpha;
        let center = self.center;
        for particle in &mut self.particles {
            particle.vx += (center.x() - particle.x) * strength;
            particle.vy += (center.y() - particle.y) * strength;
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn config() -> GraphConfig {
        GraphConfig {
            seed: Some(7),
            ..GraphConfig::default()
        }
    }

    fn distance(a: &Particle, b: &Particle) -> f32 {
        (a.x - b.x).hypot(a.y - b.y)
    }

    #[test]
    fn test_initial_spiral_is_near_center() {
        let center = Point::new(200.0, 150.0);
        let sim = Simulation::new(5, &[], center, &config());

        assert_eq!(sim.particles().len(), 5);
        for (i, particle) in sim.particles().iter().enumerate() {
            let expected = INITIAL_RADIUS * (0.5 + i as f32).sqrt();
            let actual = (particle.x - center.x()).hypot(particle.y - center.y());
            assert!((actual - expected).abs() <= 2.0 * INITIAL_JITTER);
        }
        assert!(sim.is_running());
        assert_approx_eq!(f32, sim.alpha(), 1.0);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let links = [(0, 1), (1, 2)];
        let mut a = Simulation::new(3, &links, Point::new(100.0, 100.0), &config());
        let mut b = Simulation::new(3, &links, Point::new(100.0, 100.0), &config());
        a.settle(50);
        b.settle(50);

        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_alpha_decays_and_stops() {
        let mut sim = Simulation::new(2, &[(0, 1)], Point::new(0.0, 0.0), &config());

        sim.step();
        assert_approx_eq!(f32, sim.alpha(), 1.0 - config().alpha_decay, ulps = 4);

        let taken = sim.settle(1000);
        assert!(!sim.is_running());
        assert!(sim.alpha() < config().alpha_min);
        assert!(taken < 1000);
        assert!(!sim.step());
    }

    #[test]
    fn test_linked_nodes_settle_near_link_distance() {
        let mut sim = Simulation::new(2, &[(0, 1)], Point::new(300.0, 300.0), &config());
        sim.settle(1000);

        let [a, b] = [sim.particles()[0], sim.particles()[1]];
        let d = distance(&a, &b);
        assert!(d > 60.0 && d < 200.0, "distance {d}");
    }

    #[test]
    fn test_unlinked_nodes_repel() {
        let mut sim = Simulation::new(2, &[], Point::new(0.0, 0.0), &config());
        sim.settle(1000);

        let d = distance(&sim.particles()[0], &sim.particles()[1]);
        assert!(d >= 59.0, "distance {d}");
    }

    #[test]
    fn test_pinned_particle_stays_put() {
        let mut sim = Simulation::new(3, &[(0, 1), (1, 2)], Point::new(0.0, 0.0), &config());
        assert!(sim.pin(1, Point::new(40.0, -20.0)));

        for _ in 0..20 {
            sim.tick();
        }
        let pinned = sim.particles()[1];
        assert_eq!((pinned.x, pinned.y), (40.0, -20.0));
        assert_eq!((pinned.vx, pinned.vy), (0.0, 0.0));

        assert!(sim.unpin(1));
        assert!(!sim.particles()[1].is_pinned());
        assert!(!sim.pin(9, Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_center_keeps_mean_at_center() {
        let center = Point::new(250.0, 125.0);
        let mut sim = Simulation::new(6, &[(0, 1), (2, 3), (4, 5)], center, &config());
        sim.tick();

        // Centering runs before collision, pull and integration.
        let n = sim.particles().len() as f32;
        let mean_x = sim.particles().iter().map(|p| p.x).sum::<f32>() / n;
        assert!((mean_x - center.x()).abs() < 50.0);
    }

    #[test]
    fn test_restart_after_stop() {
        let mut sim = Simulation::new(1, &[], Point::new(0.0, 0.0), &config());
        sim.stop();
        assert!(!sim.step());
        assert_eq!(sim.ticks(), 0);

        sim.set_alpha_target(0.3);
        sim.restart();
        assert!(sim.step());
        assert_eq!(sim.ticks(), 1);
    }
}
