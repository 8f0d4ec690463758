//! # Kinematics Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chassis_if::tc::{DriveMode, HeadingOption};
use chassis_lib::{
    sim::SimChassis,
    swerve::{
        ChassisParams, ChassisSpeeds, MotionIntent, SwerveChassis, SwerveKinematics, WheelPosition,
        WheelTarget, NUM_MODULES,
    },
};
use util::time::ManualClock;

fn kinematics_benchmark(c: &mut Criterion) {
    let params: ChassisParams =
        util::params::from_str(include_str!("../../params/chassis.toml")).unwrap();
    let kinematics = SwerveKinematics::new(&params.geometry).unwrap();
    let max_speed_ms = params.geometry.max_speed_ms;

    // Saturates the outer wheels
    let speeds = ChassisSpeeds::new(3.5, -2.0, 6.0);

    c.bench_function("SwerveKinematics::to_wheel_states", |b| {
        b.iter(|| kinematics.to_wheel_states(black_box(&speeds)))
    });

    c.bench_function("SwerveKinematics::desaturate", |b| {
        b.iter(|| {
            let states = kinematics.to_wheel_states(black_box(&speeds));
            let mut targets = [WheelTarget::default(); NUM_MODULES];
            for (t, s) in targets.iter_mut().zip(states.iter()) {
                t.state = *s;
            }
            SwerveKinematics::desaturate(&mut targets, max_speed_ms)
        })
    });

    let deltas = [
        WheelPosition {
            distance_m: 0.02,
            angle_deg: 10.0,
        },
        WheelPosition {
            distance_m: 0.021,
            angle_deg: 12.0,
        },
        WheelPosition {
            distance_m: 0.019,
            angle_deg: 8.0,
        },
        WheelPosition {
            distance_m: 0.02,
            angle_deg: 11.0,
        },
    ];

    c.bench_function("SwerveKinematics::to_twist", |b| {
        b.iter(|| kinematics.to_twist(black_box(&deltas)))
    });

    // ---- Full control cycle against the simulation ----

    let mut sim = SimChassis::new(&params, [0.0; NUM_MODULES]).unwrap();
    let clock = ManualClock::new(0.0);
    let mut chassis = SwerveChassis::new(
        &params,
        sim.hardware(),
        Some(sim.gyro_handle()),
        Box::new(clock.clone()),
    )
    .unwrap();

    chassis.set_motion_intent(
        DriveMode::FieldOriented,
        HeadingOption::Maintain,
        MotionIntent::from_speeds(ChassisSpeeds::new(1.0, 0.5, 0.3)),
    );
    chassis.drive_mode(DriveMode::FieldOriented);

    c.bench_function("SwerveChassis::drive_cycle", |b| {
        b.iter(|| {
            chassis.update_odometry();
            chassis.drive();
            sim.step(0.02);
            clock.advance(0.02);
        })
    });
}

criterion_group!(benches, kinematics_benchmark);
criterion_main!(benches);
