use rigkit_channel_core::{
    filter_channel, filter_static_keys, key_count, time_range, ChannelRef, ChannelSource, Curve,
    FilterOutcome, SideSel,
};
use rigkit_test_fixtures::MemoryScene;

const TOL: f64 = 0.01;

fn float_channel_with_keys(scene: &mut MemoryScene, keys: &[(f64, f64)]) -> ChannelRef {
    let obj = scene.add_object();
    let ch = scene.add_float_channel(obj, "pos.Y", 0.0);
    scene.bind_curve(ch);
    let curve = scene.memory_curve_mut(ch).expect("curve bound");
    for (t, v) in keys {
        curve.add_float(*t, *v);
    }
    ch
}

fn int_channel_with_keys(scene: &mut MemoryScene, keys: &[(f64, i64)]) -> ChannelRef {
    let obj = scene.add_object();
    let ch = scene.add_int_channel(obj, "state", 0);
    scene.bind_curve(ch);
    let curve = scene.memory_curve_mut(ch).expect("curve bound");
    for (t, v) in keys {
        curve.add_int(*t, *v);
    }
    ch
}

/// it should delete the redundant middle key of three equal flat keys
#[test]
fn deletes_middle_of_three_equal_keys() {
    let mut scene = MemoryScene::new();
    let ch = float_channel_with_keys(&mut scene, &[(0.0, 1.0), (1.0, 1.0), (2.0, 1.0)]);
    let curve = scene.memory_curve_mut(ch).expect("curve bound");

    assert_eq!(filter_static_keys(curve, TOL), (1, true));
    assert_eq!(key_count(curve), 2);
    assert_eq!(time_range(curve), Some((0.0, 2.0)));
}

/// it should keep a middle key whose value falls outside tolerance
#[test]
fn keeps_middle_key_outside_tolerance() {
    let mut scene = MemoryScene::new();
    let ch = float_channel_with_keys(&mut scene, &[(0.0, 1.0), (1.0, 1.05), (2.0, 1.0)]);
    let curve = scene.memory_curve_mut(ch).expect("curve bound");

    assert_eq!(filter_static_keys(curve, TOL), (0, false));
    assert_eq!(key_count(curve), 3);
}

/// it should never remove the peak of a 0-5-0 bounce for tolerance below 5
#[test]
fn keeps_bounce_peak() {
    let mut scene = MemoryScene::new();
    let ch = float_channel_with_keys(&mut scene, &[(0.0, 0.0), (1.0, 5.0), (2.0, 0.0)]);
    let curve = scene.memory_curve_mut(ch).expect("curve bound");

    assert_eq!(filter_static_keys(curve, 4.9), (0, false));
    assert_eq!(key_count(curve), 3);
}

/// it should delete N-2 keys from N collinear keys and be idempotent after
#[test]
fn collinear_run_collapses_to_endpoints_once() {
    let mut scene = MemoryScene::new();
    let ch = float_channel_with_keys(
        &mut scene,
        &[(0.0, 2.0), (1.0, 2.0), (2.0, 2.0), (3.0, 2.0), (4.0, 2.0)],
    );
    let curve = scene.memory_curve_mut(ch).expect("curve bound");

    assert_eq!(filter_static_keys(curve, TOL), (3, true));
    assert_eq!(key_count(curve), 2);
    // second pass finds nothing left to delete
    assert_eq!(filter_static_keys(curve, TOL), (0, true));
    assert_eq!(time_range(curve), Some((0.0, 4.0)));
}

/// it should report a zero-key curve as non-constant with nothing deleted
#[test]
fn zero_keys_report_non_constant() {
    let mut scene = MemoryScene::new();
    let ch = float_channel_with_keys(&mut scene, &[]);
    let curve = scene.memory_curve_mut(ch).expect("curve bound");

    assert_eq!(filter_static_keys(curve, TOL), (0, false));
}

/// it should report a single-key curve constant without deleting it
#[test]
fn single_key_is_constant() {
    let mut scene = MemoryScene::new();
    let ch = float_channel_with_keys(&mut scene, &[(1.0, 3.0)]);
    let curve = scene.memory_curve_mut(ch).expect("curve bound");

    assert_eq!(filter_static_keys(curve, TOL), (0, true));
    assert_eq!(key_count(curve), 1);
}

/// it should report two equal flat keys constant while keeping both
#[test]
fn two_equal_keys_are_constant() {
    let mut scene = MemoryScene::new();
    let ch = float_channel_with_keys(&mut scene, &[(0.0, 1.0), (5.0, 1.0)]);
    let curve = scene.memory_curve_mut(ch).expect("curve bound");

    assert_eq!(filter_static_keys(curve, TOL), (0, true));
    assert_eq!(key_count(curve), 2);
}

/// it should never delete a broken-value middle key
#[test]
fn broken_value_key_survives() {
    let mut scene = MemoryScene::new();
    let ch = float_channel_with_keys(&mut scene, &[(0.0, 1.0), (1.0, 1.0), (2.0, 1.0)]);
    let curve = scene.memory_curve_mut(ch).expect("curve bound");
    let middle = curve.find(1.0).expect("key at t=1");
    curve
        .set_key_value_float(middle, 1.0, SideSel::In)
        .expect("side write accepted");

    assert_eq!(filter_static_keys(curve, TOL), (0, false));
    assert_eq!(key_count(curve), 3);
}

/// it should keep equal-valued keys joined by a non-flat tangent
#[test]
fn non_flat_tangent_blocks_merge() {
    let mut scene = MemoryScene::new();
    let ch = float_channel_with_keys(&mut scene, &[(0.0, 1.0), (1.0, 1.0), (2.0, 1.0)]);
    let curve = scene.memory_curve_mut(ch).expect("curve bound");
    let first = curve.first().expect("first key");
    curve
        .set_slope(first, 1.0, SideSel::Out)
        .expect("slope write accepted");

    assert_eq!(filter_static_keys(curve, TOL), (0, false));
    assert_eq!(key_count(curve), 3);
}

/// it should compare integer curves by exact value equality
#[test]
fn integer_curves_compare_exactly() {
    let mut scene = MemoryScene::new();
    let flat = int_channel_with_keys(&mut scene, &[(0.0, 2), (1.0, 2), (2.0, 2)]);
    let curve = scene.memory_curve_mut(flat).expect("curve bound");
    assert_eq!(filter_static_keys(curve, TOL), (1, true));

    let stepped = int_channel_with_keys(&mut scene, &[(0.0, 2), (1.0, 3), (2.0, 2)]);
    let curve = scene.memory_curve_mut(stepped).expect("curve bound");
    assert_eq!(filter_static_keys(curve, TOL), (0, false));
}

/// it should report a channel without a curve as not animated
#[test]
fn filter_channel_skips_unanimated() {
    let mut scene = MemoryScene::new();
    let obj = scene.add_object();
    let ch = scene.add_float_channel(obj, "pos.X", 0.0);

    let outcome = filter_channel(&mut scene, ch, true, TOL).expect("filter runs");
    assert_eq!(outcome, FilterOutcome::NotAnimated);
}

/// it should collapse a constant curve to a static value when asked
#[test]
fn filter_channel_collapses_constant_curve() {
    let mut scene = MemoryScene::new();
    let ch = float_channel_with_keys(&mut scene, &[(0.0, 2.5), (1.0, 2.5), (2.0, 2.5)]);
    scene.set_time(0.0);

    let outcome = filter_channel(&mut scene, ch, true, TOL).expect("filter runs");
    assert_eq!(outcome, FilterOutcome::Collapsed);
    assert!(scene.memory_curve(ch).expect("curve still bound").is_empty());
    assert_eq!(scene.float(ch).expect("static read"), 2.5);
}

/// it should leave a constant curve keyed when collapse is not requested
#[test]
fn filter_channel_reports_without_collapsing() {
    let mut scene = MemoryScene::new();
    let ch = float_channel_with_keys(&mut scene, &[(0.0, 2.5), (1.0, 2.5), (2.0, 2.5)]);

    let outcome = filter_channel(&mut scene, ch, false, TOL).expect("filter runs");
    assert_eq!(
        outcome,
        FilterOutcome::Filtered {
            deleted: 1,
            is_constant: true
        }
    );
    assert_eq!(scene.memory_curve(ch).expect("curve bound").len(), 2);
}
