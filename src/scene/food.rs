//! Collectible food floating up through the sky.

use glam::DVec2;

use super::{Color, DrawCommand, DrawList, Entity, Viewport};
use crate::config::SceneConfig;

pub const FOOD_RADIUS: f64 = 12.0;
const BOB_SPEED: f64 = 0.003;
const BOB_AMPLITUDE: f64 = 3.0;
/// Food is culled once it drifts this far outside the canvas.
const CULL_MARGIN: f64 = 100.0;
/// New food starts this far below the bottom edge.
const SPAWN_DEPTH: std::ops::Range<f64> = 50.0..150.0;
/// Below the screen the cull line sits past the spawn band, so fresh food is
/// never culled before it rises into view.
const BOTTOM_CULL_MARGIN: f64 = 200.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FoodKind {
    Berry,
    Worm,
    Fruit,
}

impl FoodKind {
    pub const ALL: [FoodKind; 3] = [FoodKind::Berry, FoodKind::Worm, FoodKind::Fruit];

    pub fn points(self) -> u32 {
        match self {
            FoodKind::Berry => 10,
            FoodKind::Worm => 25,
            FoodKind::Fruit => 50,
        }
    }

    pub fn color(self) -> Color {
        match self {
            FoodKind::Berry => Color::rgb(255, 23, 68),
            FoodKind::Worm => Color::rgb(255, 111, 0),
            FoodKind::Fruit => Color::rgb(118, 255, 3),
        }
    }

    /// Weighted pick: 60% berry, 30% worm, 10% fruit.
    pub fn roll(rng: &mut fastrand::Rng) -> Self {
        let r = rng.f64();
        if r < 0.6 {
            FoodKind::Berry
        } else if r < 0.9 {
            FoodKind::Worm
        } else {
            FoodKind::Fruit
        }
    }
}

/// Stable handle into the food collection. Survives culling of other items,
/// unlike an index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FoodId(u64);

#[derive(Debug, Clone)]
pub struct FoodItem {
    id: FoodId,
    kind: FoodKind,
    pos: DVec2,
    collected: bool,
    bob_phase: f64,
}

impl FoodItem {
    fn new(id: FoodId, kind: FoodKind, pos: DVec2, bob_phase: f64) -> Self {
        Self { id, kind, pos, collected: false, bob_phase }
    }

    pub fn id(&self) -> FoodId {
        self.id
    }

    pub fn kind(&self) -> FoodKind {
        self.kind
    }

    pub fn pos(&self) -> DVec2 {
        self.pos
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    /// Terminal; returns whether this call did the collecting.
    pub fn collect(&mut self) -> bool {
        !std::mem::replace(&mut self.collected, true)
    }

    fn update(&mut self, dt_ms: f64, rise: f64) {
        if self.collected {
            return;
        }
        self.bob_phase += BOB_SPEED * dt_ms;
        self.pos.y -= rise;
    }

    pub fn touches(&self, center: DVec2, radius: f64) -> bool {
        !self.collected && self.pos.distance(center) < FOOD_RADIUS + radius
    }
}

impl Entity for FoodItem {
    fn is_alive(&self, viewport: &Viewport) -> bool {
        !self.collected
            && self.pos.y > -CULL_MARGIN
            && self.pos.y < viewport.height + BOTTOM_CULL_MARGIN
    }
}

pub struct FoodSpawner {
    items: Vec<FoodItem>,
    spawn_timer: f64,
    next_id: u64,
}

impl FoodSpawner {
    /// Starts with an evenly spread batch so the sky is never empty.
    pub fn new(viewport: &Viewport, config: &SceneConfig, rng: &mut fastrand::Rng) -> Self {
        let mut spawner = Self { items: Vec::new(), spawn_timer: 0.0, next_id: 0 };
        spawner.spawn_initial(viewport, config.initial_food, rng);
        spawner
    }

    fn spawn_initial(&mut self, viewport: &Viewport, count: usize, rng: &mut fastrand::Rng) {
        let span = (viewport.width - 160.0).max(0.0);
        for i in 0..count {
            let t = if count > 1 { i as f64 / (count - 1) as f64 } else { 0.5 };
            let x = 80.0 + span * t;
            let y = 100.0 + (viewport.height - 200.0).max(0.0) * rng.f64();
            let kind = FoodKind::ALL[i % FoodKind::ALL.len()];
            self.push(kind, DVec2::new(x, y), rng);
        }
    }

    fn push(&mut self, kind: FoodKind, pos: DVec2, rng: &mut fastrand::Rng) -> FoodId {
        let id = FoodId(self.next_id);
        self.next_id += 1;
        let phase = rng.f64() * std::f64::consts::TAU;
        self.items.push(FoodItem::new(id, kind, pos, phase));
        id
    }

    /// New food appears just below the bottom edge and scrolls into view.
    fn spawn(&mut self, viewport: &Viewport, rng: &mut fastrand::Rng) -> FoodId {
        let x = 50.0 + rng.f64() * (viewport.width - 100.0).max(0.0);
        let y = viewport.height + SPAWN_DEPTH.start + rng.f64() * (SPAWN_DEPTH.end - SPAWN_DEPTH.start);
        let kind = FoodKind::roll(rng);
        self.push(kind, DVec2::new(x, y), rng)
    }

    /// `rise` is how far the world scrolled this frame.
    pub fn update(
        &mut self,
        dt_ms: f64,
        rise: f64,
        viewport: &Viewport,
        config: &SceneConfig,
        rng: &mut fastrand::Rng,
    ) {
        self.spawn_timer += dt_ms;
        if self.spawn_timer >= config.food_spawn_interval_ms && self.items.len() < config.food_cap
        {
            self.spawn(viewport, rng);
            self.spawn_timer = 0.0;
        }
        for item in &mut self.items {
            item.update(dt_ms, rise);
        }
        self.items.retain(|item| item.is_alive(viewport));
    }

    /// Mark every item touching the circle as collected, returning the kinds
    /// collected by this call. Already-collected items never count twice.
    pub fn collect_touching(&mut self, center: DVec2, radius: f64) -> Vec<FoodKind> {
        self.items
            .iter_mut()
            .filter(|item| item.touches(center, radius))
            .filter_map(|item| item.collect().then_some(item.kind))
            .collect()
    }

    /// Nearest uncollected item; ties go to the earliest in collection order.
    pub fn nearest_uncollected(&self, from: DVec2) -> Option<FoodId> {
        let mut best: Option<(FoodId, f64)> = None;
        for item in self.items.iter().filter(|item| !item.collected) {
            let d = item.pos.distance(from);
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((item.id, d));
            }
        }
        best.map(|(id, _)| id)
    }

    pub fn get(&self, id: FoodId) -> Option<&FoodItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: FoodId) -> Option<&mut FoodItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    pub fn draw(&self, out: &mut DrawList) {
        for item in self.items.iter().filter(|item| !item.collected) {
            let bob = item.bob_phase.sin() * BOB_AMPLITUDE;
            out.push(DrawCommand::Food {
                pos: item.pos + DVec2::new(0.0, bob),
                radius: FOOD_RADIUS,
                kind: item.kind,
            });
        }
    }

    /// Drop every item and lay out a fresh initial batch. Ids keep counting
    /// up, so handles from before the reset never match new food.
    pub fn reset(&mut self, viewport: &Viewport, config: &SceneConfig, rng: &mut fastrand::Rng) {
        self.items.clear();
        self.spawn_timer = 0.0;
        self.spawn_initial(viewport, config.initial_food, rng);
    }

    #[cfg(test)]
    pub(crate) fn insert_for_test(&mut self, kind: FoodKind, pos: DVec2) -> FoodId {
        let id = FoodId(self.next_id);
        self.next_id += 1;
        self.items.push(FoodItem::new(id, kind, pos, 0.0));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_spawner() -> FoodSpawner {
        FoodSpawner { items: Vec::new(), spawn_timer: 0.0, next_id: 0 }
    }

    #[test]
    fn initial_batch_spreads_across_width() {
        let vp = Viewport::new(800.0, 600.0);
        let mut rng = fastrand::Rng::with_seed(3);
        let spawner = FoodSpawner::new(&vp, &SceneConfig::default(), &mut rng);
        let items = spawner.items();
        assert_eq!(items.len(), 8);
        assert_eq!(items[0].pos().x, 80.0);
        assert_eq!(items[7].pos().x, 720.0);
        assert_eq!(items[0].kind(), FoodKind::Berry);
        assert_eq!(items[1].kind(), FoodKind::Worm);
        assert_eq!(items[2].kind(), FoodKind::Fruit);
    }

    #[test]
    fn spawns_on_interval_below_the_horizon_up_to_cap() {
        let vp = Viewport::new(800.0, 600.0);
        let cfg = SceneConfig { food_cap: 2, ..SceneConfig::default() };
        let mut rng = fastrand::Rng::with_seed(9);
        let mut spawner = empty_spawner();
        spawner.update(1_000.0, 0.0, &vp, &cfg, &mut rng);
        assert!(spawner.items().is_empty());
        spawner.update(500.0, 0.0, &vp, &cfg, &mut rng);
        assert_eq!(spawner.items().len(), 1);
        assert!(spawner.items()[0].pos().y > vp.height);
        for _ in 0..10 {
            spawner.update(1_500.0, 0.0, &vp, &cfg, &mut rng);
        }
        assert_eq!(spawner.items().len(), 2);
    }

    #[test]
    fn collected_items_award_once_and_are_culled() {
        let vp = Viewport::new(800.0, 600.0);
        let mut spawner = empty_spawner();
        spawner.insert_for_test(FoodKind::Worm, DVec2::new(100.0, 100.0));
        spawner.insert_for_test(FoodKind::Berry, DVec2::new(400.0, 100.0));
        let got = spawner.collect_touching(DVec2::new(110.0, 100.0), 25.0);
        assert_eq!(got, vec![FoodKind::Worm]);
        assert!(spawner.collect_touching(DVec2::new(110.0, 100.0), 25.0).is_empty());
        let mut rng = fastrand::Rng::with_seed(1);
        spawner.update(16.0, 0.0, &vp, &SceneConfig { food_cap: 0, ..Default::default() }, &mut rng);
        assert_eq!(spawner.items().len(), 1);
    }

    #[test]
    fn boundary_distance_does_not_collect() {
        let mut spawner = empty_spawner();
        spawner.insert_for_test(FoodKind::Berry, DVec2::new(37.0, 0.0));
        assert!(spawner.collect_touching(DVec2::ZERO, 25.0).is_empty());
    }

    #[test]
    fn food_rides_the_scroll_and_leaves_the_top() {
        let vp = Viewport::new(800.0, 600.0);
        let cfg = SceneConfig { food_cap: 0, ..SceneConfig::default() };
        let mut rng = fastrand::Rng::with_seed(1);
        let mut spawner = empty_spawner();
        let id = spawner.insert_for_test(FoodKind::Berry, DVec2::new(100.0, -98.0));
        spawner.update(16.0, 4.0, &vp, &cfg, &mut rng);
        assert!(spawner.get(id).is_none());
    }

    #[test]
    fn fresh_food_survives_its_spawn_frame() {
        let vp = Viewport::new(800.0, 600.0);
        let cfg = SceneConfig { food_spawn_interval_ms: 16.0, ..SceneConfig::default() };
        for seed in 0..200 {
            let mut rng = fastrand::Rng::with_seed(seed);
            let mut spawner = empty_spawner();
            spawner.update(16.0, 1.28, &vp, &cfg, &mut rng);
            assert_eq!(spawner.items().len(), 1, "seed {seed}");
            let y = spawner.items()[0].pos().y;
            assert!(y > vp.height && y < vp.height + BOTTOM_CULL_MARGIN, "seed {seed}: {y}");
        }
    }

    #[test]
    fn reset_lays_out_a_new_batch_with_fresh_ids() {
        let vp = Viewport::new(800.0, 600.0);
        let cfg = SceneConfig::default();
        let mut rng = fastrand::Rng::with_seed(5);
        let mut spawner = FoodSpawner::new(&vp, &cfg, &mut rng);
        let old = spawner.items()[0].id();
        spawner.get_mut(old).unwrap().collect();
        spawner.reset(&vp, &cfg, &mut rng);
        assert_eq!(spawner.items().len(), cfg.initial_food);
        assert!(spawner.items().iter().all(|item| !item.is_collected()));
        assert!(spawner.get(old).is_none());
    }

    #[test]
    fn nearest_prefers_first_on_ties_and_skips_collected() {
        let mut spawner = empty_spawner();
        let a = spawner.insert_for_test(FoodKind::Berry, DVec2::new(-10.0, 0.0));
        let b = spawner.insert_for_test(FoodKind::Berry, DVec2::new(10.0, 0.0));
        assert_eq!(spawner.nearest_uncollected(DVec2::ZERO), Some(a));
        spawner.get_mut(a).unwrap().collect();
        assert_eq!(spawner.nearest_uncollected(DVec2::ZERO), Some(b));
        spawner.get_mut(b).unwrap().collect();
        assert_eq!(spawner.nearest_uncollected(DVec2::ZERO), None);
    }
}
