//! Seam to the fleet-monitoring platform SDK

use tracing::info;

use crate::config::FootprintSpec;
use crate::transform::Pose;

/// Where transformed poses end up.
///
/// The real platform SDK lives behind this trait; the connector never talks
/// to it directly so tests can record what would have been published.
pub trait PosePublisher: Send + Sync {
    /// Publish a pose for the given robot
    fn publish_pose(&self, robot_id: &str, pose: &Pose);

    /// Publish the robot's footprint geometry
    fn publish_footprint(&self, robot_id: &str, spec: &FootprintSpec);
}

/// Publisher that logs poses instead of forwarding them.
///
/// Used when running the binary without platform credentials.
pub struct LogPublisher;

impl PosePublisher for LogPublisher {
    fn publish_pose(&self, robot_id: &str, pose: &Pose) {
        info!(
            robot_id,
            x = pose.x,
            y = pose.y,
            yaw = pose.yaw,
            "pose update"
        );
    }

    fn publish_footprint(&self, robot_id: &str, spec: &FootprintSpec) {
        info!(robot_id, ?spec, "footprint update");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records every publish call for assertions
    #[derive(Default)]
    pub struct RecordingPublisher {
        pub poses: Mutex<Vec<(String, Pose)>>,
        pub footprints: Mutex<Vec<String>>,
    }

    impl PosePublisher for RecordingPublisher {
        fn publish_pose(&self, robot_id: &str, pose: &Pose) {
            if let Ok(mut poses) = self.poses.lock() {
                poses.push((robot_id.to_string(), *pose));
            }
        }

        fn publish_footprint(&self, robot_id: &str, _spec: &FootprintSpec) {
            if let Ok(mut footprints) = self.footprints.lock() {
                footprints.push(robot_id.to_string());
            }
        }
    }
}
