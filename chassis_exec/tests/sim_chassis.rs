//! Closed loop tests of the chassis against the simulated equipment.

use std::sync::Arc;

use approx::assert_relative_eq;

use chassis_if::tc::{ControllerKind, DriveMode, HeadingOption, RobotMode, Tc};
use chassis_lib::{
    behaviours::{build_chassis_state_mgr, ChassisCtx, IDLE, TELEOP_DRIVE},
    loc::Pose2D,
    sim::SimChassis,
    state_mgr::StateMgr,
    swerve::{ChassisParams, MotionIntent, SwerveChassis, Trajectory, TrajectoryState},
};
use util::{
    script_interpreter::{PendingTcs, ScriptInterpreter},
    time::ManualClock,
};

const DT_S: f64 = 0.02;

struct Rig {
    sim: SimChassis,
    clock: ManualClock,
    ctx: ChassisCtx,
    mgr: StateMgr<ChassisCtx>,
}

fn params() -> ChassisParams {
    util::params::from_str(include_str!("../../params/chassis.toml")).unwrap()
}

fn rig() -> Rig {
    let params = params();
    let sim = SimChassis::new(&params, [20.0, -130.0, 75.0, 5.0]).unwrap();
    let clock = ManualClock::new(0.0);
    let chassis = SwerveChassis::new(
        &params,
        sim.hardware(),
        Some(sim.gyro_handle()),
        Box::new(clock.clone()),
    )
    .unwrap();
    let mut ctx = ChassisCtx::new(chassis);
    let mgr = build_chassis_state_mgr(&params, &mut ctx);

    Rig {
        sim,
        clock,
        ctx,
        mgr,
    }
}

impl Rig {
    fn cycle(&mut self) {
        self.ctx.chassis.update_odometry();
        self.mgr.run_current_state(&mut self.ctx);
        self.sim.step(DT_S);
        self.clock.advance(DT_S);
    }

    fn run_script(&mut self, script: &str) {
        let mut si = ScriptInterpreter::from_str(script).unwrap();
        let mut time_s = 0.0;

        loop {
            match si.get_pending_tcs(time_s) {
                PendingTcs::None => (),
                PendingTcs::Some(tcs) => {
                    for tc in tcs {
                        match tc {
                            Tc::Input(i) => self.ctx.input = i,
                            Tc::Mode(m) => self.ctx.robot_mode = m,
                            Tc::Trajectory(_) => panic!("No trajectories in test scripts"),
                        }
                    }
                }
                PendingTcs::EndOfScript => break,
            }

            self.cycle();
            time_s += DT_S;
        }

        self.ctx.chassis.update_odometry();
    }
}

fn assert_pose_matches_truth(rig: &Rig) {
    let est = rig.ctx.chassis.pose();
    let truth = rig.sim.truth_pose();

    assert_relative_eq!(est.x_m, truth.x_m, epsilon = 1e-6);
    assert_relative_eq!(est.y_m, truth.y_m, epsilon = 1e-6);
    assert_relative_eq!(est.heading_deg, truth.heading_deg, epsilon = 1e-6);
}

#[test]
fn test_scripted_teleop() {
    let mut rig = rig();

    rig.run_script(
        r#"
        0.0: {"type": "MODE", "payload": "Teleop"};
        0.5: {"type": "INPUT", "payload": {"drive": 0.5}};
        1.5: {"type": "INPUT", "payload": {"steer": 0.5}};
        2.5: {"type": "INPUT", "payload": {"hold_position": true}};
        3.0: {"type": "MODE", "payload": "Teleop"};
        "#,
    );

    assert_eq!(rig.mgr.current_state(), Some(TELEOP_DRIVE));
    assert_eq!(rig.ctx.chassis.current_drive_mode(), DriveMode::Stationary);

    // One second forwards then one second left at 1.35 m/s
    let pose = rig.ctx.chassis.pose();
    assert_relative_eq!(pose.x_m, 1.35, epsilon = 0.05);
    assert_relative_eq!(pose.y_m, 1.35, epsilon = 0.05);
    assert_relative_eq!(pose.heading_deg, 0.0, epsilon = 0.5);
    assert_pose_matches_truth(&rig);
}

#[test]
fn test_disabled_stops_the_chassis() {
    let mut rig = rig();

    rig.run_script(
        r#"
        0.0: {"type": "MODE", "payload": "Teleop"};
        0.0: {"type": "INPUT", "payload": {"drive": 1.0, "robot_oriented": true}};
        0.5: {"type": "MODE", "payload": "Disabled"};
        1.0: {"type": "MODE", "payload": "Disabled"};
        "#,
    );

    assert_eq!(rig.mgr.current_state(), Some(IDLE));

    // Stopped after half a second of driving even though the input is still held
    let pose = rig.ctx.chassis.pose();
    assert_relative_eq!(pose.x_m, 0.5 * 2.7, epsilon = 0.06);
    for m in rig.ctx.chassis.modules().iter() {
        assert_eq!(m.state().speed_ms, 0.0);
    }
}

#[test]
fn test_ramsete_straight_line() {
    let mut rig = rig();
    let trajectory = Arc::new(
        Trajectory::new(vec![
            TrajectoryState {
                time_s: 0.0,
                pose: Pose2D::new(0.0, 0.0, 0.0),
                velocity_ms: 1.0,
                curvature_m: 0.0,
            },
            TrajectoryState {
                time_s: 2.0,
                pose: Pose2D::new(2.0, 0.0, 0.0),
                velocity_ms: 1.0,
                curvature_m: 0.0,
            },
        ])
        .unwrap(),
    );

    let intent = MotionIntent {
        trajectory: Some(trajectory),
        controller_kind: ControllerKind::Ramsete,
        ..MotionIntent::default()
    };

    for _ in 0..100 {
        rig.ctx.chassis.update_odometry();
        rig.ctx.chassis.set_motion_intent(
            DriveMode::TrajectoryFollowing,
            HeadingOption::Default,
            intent.clone(),
        );
        rig.ctx.chassis.drive_mode(DriveMode::TrajectoryFollowing);
        rig.sim.step(DT_S);
        rig.clock.advance(DT_S);
    }
    rig.ctx.chassis.update_odometry();

    let pose = rig.ctx.chassis.pose();
    assert_relative_eq!(pose.x_m, 2.0, epsilon = 0.05);
    assert_relative_eq!(pose.y_m, 0.0, epsilon = 1e-3);
    assert_pose_matches_truth(&rig);
}

#[test]
fn test_auton_shipped_trajectory() {
    let mut rig = rig();
    let trajectory = Trajectory::from_json(include_str!(
        "../../params/trajectories/straight_then_left.json"
    ))
    .unwrap();
    let end = *trajectory.states().last().unwrap();

    rig.ctx.trajectory = Some(Arc::new(trajectory));
    rig.ctx.robot_mode = RobotMode::Autonomous;

    for _ in 0..((end.time_s / DT_S) as usize + 50) {
        rig.cycle();
    }
    rig.ctx.chassis.update_odometry();

    assert!(rig.mgr.at_target());
    assert_eq!(rig.ctx.chassis.current_drive_mode(), DriveMode::Stationary);

    let pose = rig.ctx.chassis.pose();
    assert_relative_eq!(pose.x_m, end.pose.x_m, epsilon = 0.1);
    assert_relative_eq!(pose.y_m, end.pose.y_m, epsilon = 0.1);
    // The heading controller lags the turn a little
    assert_relative_eq!(pose.heading_deg, end.pose.heading_deg, epsilon = 15.0);
    assert_pose_matches_truth(&rig);
}
