use rigkit_channel_core::{
    copy_all_channels, copy_channels, mirror_copy, read_value, ChannelLinks, ChannelSink,
    ChannelSource, CopyOptions, Curve, MirrorRules, ObjectId, ReadMode, StorageKind,
};
use rigkit_test_fixtures::MemoryScene;

fn approx(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn two_objects(scene: &mut MemoryScene) -> (ObjectId, ObjectId) {
    (scene.add_object(), scene.add_object())
}

/// it should copy a negated static value without creating a curve
#[test]
fn negated_static_copy_stays_static() {
    let mut scene = MemoryScene::new();
    let (src, dst) = two_objects(&mut scene);
    let src_ch = scene.add_float_channel(src, "pos.X", 3.5);
    let dst_ch = scene.add_float_channel(dst, "pos.X", 0.0);

    let opts = CopyOptions {
        negate: true,
        ..CopyOptions::default()
    };
    let report = copy_channels(&mut scene, src, dst, &["pos.X"], None::<&[&str]>, &opts);

    assert!(report.ok());
    assert_eq!(report.copied, 1);
    approx(scene.float(dst_ch).expect("read"), -3.5, 1e-12);
    assert!(scene.memory_curve(dst_ch).is_none());
    // source untouched
    approx(scene.float(src_ch).expect("read"), 3.5, 1e-12);
}

/// it should rebase a Key-mode capture to the requested write time
#[test]
fn key_copy_lands_at_write_time() {
    let mut scene = MemoryScene::new();
    let (src, dst) = two_objects(&mut scene);
    let src_ch = scene.add_float_channel(src, "rot.X", 0.0);
    scene.add_float_channel(dst, "rot.X", 0.0);
    scene.bind_curve(src_ch);
    let curve = scene.memory_curve_mut(src_ch).expect("curve bound");
    curve.add_float(10.0, 7.0);
    scene.set_time(10.0);

    let opts = CopyOptions {
        read_mode: ReadMode::Key,
        write_time: 0.0,
        ..CopyOptions::default()
    };
    let report = copy_channels(&mut scene, src, dst, &["rot.X"], None::<&[&str]>, &opts);

    assert!(report.ok());
    let dst_ch = scene.lookup(dst, "rot.X").expect("channel exists");
    let curve = scene.memory_curve(dst_ch).expect("curve created");
    assert_eq!(curve.len(), 1);
    assert!(curve.find(0.0).is_some());
    approx(curve.evaluate(0.0), 7.0, 1e-12);
}

/// it should truncate mismatched name lists to the shorter one
#[test]
fn mismatched_name_lists_truncate() {
    let mut scene = MemoryScene::new();
    let (src, dst) = two_objects(&mut scene);
    scene.add_float_channel(src, "a", 1.0);
    scene.add_float_channel(src, "b", 2.0);
    let dst_a = scene.add_float_channel(dst, "a2", 0.0);
    let dst_b = scene.add_float_channel(dst, "b2", 0.0);

    let report = copy_channels(
        &mut scene,
        src,
        dst,
        &["a", "b"],
        Some(&["a2"]),
        &CopyOptions::default(),
    );

    assert_eq!(report.copied, 1);
    approx(scene.float(dst_a).expect("read"), 1.0, 1e-12);
    approx(scene.float(dst_b).expect("read"), 0.0, 1e-12);
}

/// it should create a missing destination channel with the source's kind
#[test]
fn add_if_missing_creates_destination() {
    let mut scene = MemoryScene::new();
    let (src, dst) = two_objects(&mut scene);
    let src_ch = scene.add_channel_of_kind(src, "rot.Z", StorageKind::Angle);
    scene.set_float(src_ch, 0.5).expect("static write");

    let opts = CopyOptions {
        add_if_missing: true,
        ..CopyOptions::default()
    };
    let report = copy_channels(&mut scene, src, dst, &["rot.Z"], None::<&[&str]>, &opts);

    assert!(report.ok());
    let dst_ch = scene.lookup(dst, "rot.Z").expect("channel created");
    assert_eq!(scene.storage_kind(dst_ch).expect("kind"), StorageKind::Angle);
    approx(scene.float(dst_ch).expect("read"), 0.5, 1e-12);
}

/// it should record an unresolvable pair and keep copying the rest
#[test]
fn missing_destination_is_non_fatal() {
    let mut scene = MemoryScene::new();
    let (src, dst) = two_objects(&mut scene);
    scene.add_float_channel(src, "missing", 9.0);
    scene.add_float_channel(src, "present", 4.0);
    let dst_ch = scene.add_float_channel(dst, "present", 0.0);

    let report = copy_channels(
        &mut scene,
        src,
        dst,
        &["missing", "present"],
        None::<&[&str]>,
        &CopyOptions::default(),
    );

    assert_eq!(report.copied, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "missing");
    assert!(report.ok());
    approx(scene.float(dst_ch).expect("read"), 4.0, 1e-12);
}

/// it should report failure only when every pair failed
#[test]
fn all_pairs_failing_reports_not_ok() {
    let mut scene = MemoryScene::new();
    let (src, dst) = two_objects(&mut scene);
    scene.add_float_channel(src, "only.src", 1.0);

    let report = copy_channels(
        &mut scene,
        src,
        dst,
        &["only.src", "nowhere"],
        None::<&[&str]>,
        &CopyOptions::default(),
    );

    assert_eq!(report.copied, 0);
    assert_eq!(report.failures.len(), 2);
    assert!(!report.ok());
}

/// it should swap values under a mutual copy
#[test]
fn mutual_copy_swaps_both_ends() {
    let mut scene = MemoryScene::new();
    let (src, dst) = two_objects(&mut scene);
    let src_ch = scene.add_float_channel(src, "blend", 1.0);
    let dst_ch = scene.add_float_channel(dst, "blend", 2.0);

    let opts = CopyOptions {
        mutual: true,
        ..CopyOptions::default()
    };
    let report = copy_channels(&mut scene, src, dst, &["blend"], None::<&[&str]>, &opts);

    assert!(report.ok());
    approx(scene.float(src_ch).expect("read"), 2.0, 1e-12);
    approx(scene.float(dst_ch).expect("read"), 1.0, 1e-12);
}

/// it should still copy forward when a mutual pair's destination is new
#[test]
fn mutual_copy_tolerates_missing_destination() {
    let mut scene = MemoryScene::new();
    let (src, dst) = two_objects(&mut scene);
    let src_ch = scene.add_float_channel(src, "blend", 1.5);

    let opts = CopyOptions {
        mutual: true,
        add_if_missing: true,
        ..CopyOptions::default()
    };
    let report = copy_channels(&mut scene, src, dst, &["blend"], None::<&[&str]>, &opts);

    assert!(report.ok());
    assert_eq!(report.copied, 1);
    let dst_ch = scene.lookup(dst, "blend").expect("channel created");
    approx(scene.float(dst_ch).expect("read"), 1.5, 1e-12);
    // nothing existed to copy back; the source keeps its value
    approx(scene.float(src_ch).expect("read"), 1.5, 1e-12);
}

/// it should obey the mirroring sign law on reads
#[test]
fn negated_read_flips_sign() {
    let mut scene = MemoryScene::new();
    let obj = scene.add_object();
    let ch = scene.add_float_channel(obj, "pos.X", 1.25);

    let plain = read_value(&scene, ch, false).expect("read");
    let negated = read_value(&scene, ch, true).expect("read");
    assert_eq!(negated, plain.negated());
}

/// it should pick out the sign-flipping channels by name
#[test]
fn mirror_rules_classify_names() {
    let rules = MirrorRules::default();
    assert!(rules.negates("pos.X", false));
    assert!(rules.negates("pos.X", true));
    assert!(!rules.negates("rot.Y", false));
    assert!(rules.negates("rot.Y", true));
    assert!(!rules.negates("pos.Y", false));
    assert!(!rules.negates("pos.Y", true));
}

/// it should negate only the mirror-axis channels between side objects
#[test]
fn mirror_copy_between_sides() {
    let mut scene = MemoryScene::new();
    let (left, right) = two_objects(&mut scene);
    scene.add_float_channel(left, "pos.X", 1.0);
    scene.add_float_channel(left, "pos.Y", 2.0);
    scene.add_float_channel(left, "rot.Y", 0.3);
    let r_x = scene.add_float_channel(right, "pos.X", 0.0);
    let r_y = scene.add_float_channel(right, "pos.Y", 0.0);
    let r_rot = scene.add_float_channel(right, "rot.Y", 0.0);

    let report = mirror_copy(
        &mut scene,
        left,
        right,
        &["pos.X", "pos.Y", "rot.Y"],
        &MirrorRules::default(),
        &CopyOptions::default(),
    );

    assert!(report.ok());
    assert_eq!(report.copied, 3);
    approx(scene.float(r_x).expect("read"), -1.0, 1e-12);
    approx(scene.float(r_y).expect("read"), 2.0, 1e-12);
    approx(scene.float(r_rot).expect("read"), 0.3, 1e-12);
}

/// it should also flip the out-of-plane rotations on a center object
#[test]
fn mirror_copy_on_center_object() {
    let mut scene = MemoryScene::new();
    let obj = scene.add_object();
    let pos_x = scene.add_float_channel(obj, "pos.X", 1.2);
    let pos_y = scene.add_float_channel(obj, "pos.Y", 2.0);
    let rot_y = scene.add_float_channel(obj, "rot.Y", 0.3);

    let report = mirror_copy(
        &mut scene,
        obj,
        obj,
        &["pos.X", "pos.Y", "rot.Y"],
        &MirrorRules::default(),
        &CopyOptions::default(),
    );

    assert!(report.ok());
    approx(scene.float(pos_x).expect("read"), -1.2, 1e-12);
    approx(scene.float(pos_y).expect("read"), 2.0, 1e-12);
    approx(scene.float(rot_y).expect("read"), -0.3, 1e-12);
}

/// it should skip channels with no opposite-side counterpart
#[test]
fn mirror_copy_skips_missing_counterparts() {
    let mut scene = MemoryScene::new();
    let (left, right) = two_objects(&mut scene);
    scene.add_float_channel(left, "pos.X", 1.0);
    scene.add_float_channel(left, "custom.twist", 0.7);
    let r_x = scene.add_float_channel(right, "pos.X", 0.0);

    let report = mirror_copy(
        &mut scene,
        left,
        right,
        &["pos.X", "custom.twist"],
        &MirrorRules::default(),
        &CopyOptions::default(),
    );

    assert!(report.ok());
    assert_eq!(report.copied, 1);
    assert_eq!(report.failures.len(), 1);
    approx(scene.float(r_x).expect("read"), -1.0, 1e-12);
}

/// it should copy every source channel by name
#[test]
fn copy_all_matches_by_name() {
    let mut scene = MemoryScene::new();
    let (src, dst) = two_objects(&mut scene);
    scene.add_float_channel(src, "a", 1.0);
    scene.add_float_channel(src, "b", 2.0);
    let dst_a = scene.add_float_channel(dst, "a", 0.0);
    let dst_b = scene.add_float_channel(dst, "b", 0.0);

    let report = copy_all_channels(&mut scene, src, dst, &CopyOptions::default());

    assert!(report.ok());
    assert_eq!(report.copied, 2);
    approx(scene.float(dst_a).expect("read"), 1.0, 1e-12);
    approx(scene.float(dst_b).expect("read"), 2.0, 1e-12);
}

/// it should report link edits as plain booleans
#[test]
fn link_edits_are_best_effort() {
    let mut scene = MemoryScene::new();
    let obj = scene.add_object();
    let a = scene.add_float_channel(obj, "a", 0.0);
    let b = scene.add_float_channel(obj, "b", 0.0);
    let ghost = rigkit_channel_core::ChannelRef::new(obj, 99);

    let mut links = ChannelLinks::new(&mut scene);
    assert!(links.add(a, b));
    // an already-present link counts as success and is not duplicated
    assert!(links.add(a, b));
    assert_eq!(links.targets(a), vec![b]);
    // an unresolvable endpoint is a genuine refusal
    assert!(!links.add(a, ghost));
    assert!(links.remove(a, b));
    assert!(!links.remove(a, b));
    assert!(links.targets(a).is_empty());
}
