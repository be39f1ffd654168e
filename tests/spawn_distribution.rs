// Weighted food kinds: berries are common, fruit is rare.

use kiwi_timer::scene::food::FoodKind;

#[test]
fn food_kinds_follow_sixty_thirty_ten() {
    let mut rng = fastrand::Rng::with_seed(2024);
    let draws = 100_000;
    let (mut berry, mut worm, mut fruit) = (0u32, 0u32, 0u32);
    for _ in 0..draws {
        match FoodKind::roll(&mut rng) {
            FoodKind::Berry => berry += 1,
            FoodKind::Worm => worm += 1,
            FoodKind::Fruit => fruit += 1,
        }
    }
    let share = |n: u32| n as f64 / draws as f64;
    assert!((share(berry) - 0.6).abs() < 0.01, "berry {}", share(berry));
    assert!((share(worm) - 0.3).abs() < 0.01, "worm {}", share(worm));
    assert!((share(fruit) - 0.1).abs() < 0.01, "fruit {}", share(fruit));
}

#[test]
fn points_rank_with_rarity() {
    assert_eq!(FoodKind::Berry.points(), 10);
    assert_eq!(FoodKind::Worm.points(), 25);
    assert_eq!(FoodKind::Fruit.points(), 50);
}
