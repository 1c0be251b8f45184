use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use rigkit_core::math::{Vec3, quat_from_rotation_z};
use rigkit_skeleton::{BoneId, Skeleton};

/// A fully chained line of `count` unit bones along +X.
fn chain(count: usize) -> (Skeleton, Vec<BoneId>) {
    let mut skeleton = Skeleton::new("bench");
    let mut bones = Vec::with_capacity(count);
    let mut parent = None;
    for i in 0..count {
        let start = Vec3::new(i as f32, 0.0, 0.0);
        let bone = skeleton.create_bone(parent, start, start + Vec3::x(), parent.is_some(), format!("bone_{i}"));
        bones.push(bone);
        parent = Some(bone);
    }
    (skeleton, bones)
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

fn bench_create_chain_100(c: &mut Criterion) {
    c.bench_function("create_chain_100", |b| {
        b.iter(|| black_box(chain(100)));
    });
}

// ---------------------------------------------------------------------------
// Propagation
// ---------------------------------------------------------------------------

fn bench_rotate_chain_root(c: &mut Criterion) {
    let (mut skeleton, bones) = chain(100);
    let root = bones[0];
    c.bench_function("rotate_root_of_100_chain", |b| {
        b.iter(|| {
            skeleton
                .bone_mut(root)
                .set_local_rotation(black_box(quat_from_rotation_z(0.01)));
        });
    });
}

fn bench_move_joints(c: &mut Criterion) {
    c.bench_function("move_joints_mid_chain_100", |b| {
        b.iter_batched(
            || chain(100),
            |(mut skeleton, bones)| {
                skeleton.move_joints(&bones[50..51], black_box(Vec3::new(0.0, 0.1, 0.0)));
                skeleton
            },
            BatchSize::SmallInput,
        );
    });
}

// ---------------------------------------------------------------------------
// Poses
// ---------------------------------------------------------------------------

fn bench_world_pose_round_trip(c: &mut Criterion) {
    let (mut skeleton, _) = chain(100);
    let pose = skeleton.world_pose();
    c.bench_function("set_world_pose_100", |b| {
        b.iter(|| skeleton.set_world_pose(black_box(&pose)));
    });
}

fn bench_restore_default_pose(c: &mut Criterion) {
    let (mut skeleton, _) = chain(100);
    if skeleton.set_default_pose().is_err() {
        return;
    }
    c.bench_function("restore_default_pose_100", |b| {
        b.iter(|| skeleton.restore_default_pose());
    });
}

criterion_group!(
    benches,
    bench_create_chain_100,
    bench_rotate_chain_root,
    bench_move_joints,
    bench_world_pose_round_trip,
    bench_restore_default_pose,
);
criterion_main!(benches);
