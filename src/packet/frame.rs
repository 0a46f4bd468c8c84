//! Real-time telemetry frame decoding.
//!
//! One [`TelemetryFrame`] is decoded per datagram and superseded wholesale by
//! the next; frames are immutable snapshots and never updated in place.

use super::layout;
use super::wire::{f32_at, i8_at, i16_at, i32_at, u8_at, u32_at};
use super::RawDatagram;

/// A three-axis vector in the simulator's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// One value per wheel, in the wire order of every per-wheel block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelSet<T> {
    pub front_left: T,
    pub front_right: T,
    pub rear_left: T,
    pub rear_right: T,
}

impl<T: Copy> WheelSet<T> {
    /// All four values in wire order (FL, FR, RL, RR).
    pub fn as_array(&self) -> [T; 4] {
        [self.front_left, self.front_right, self.rear_left, self.rear_right]
    }
}

fn vec3_at(raw: &RawDatagram, offset: usize) -> Vec3 {
    Vec3 { x: f32_at(raw, offset), y: f32_at(raw, offset + 4), z: f32_at(raw, offset + 8) }
}

fn wheels_f32_at(raw: &RawDatagram, offset: usize) -> WheelSet<f32> {
    WheelSet {
        front_left: f32_at(raw, offset),
        front_right: f32_at(raw, offset + 4),
        rear_left: f32_at(raw, offset + 8),
        rear_right: f32_at(raw, offset + 12),
    }
}

fn wheels_i32_at(raw: &RawDatagram, offset: usize) -> WheelSet<i32> {
    WheelSet {
        front_left: i32_at(raw, offset),
        front_right: i32_at(raw, offset + 4),
        rear_left: i32_at(raw, offset + 8),
        rear_right: i32_at(raw, offset + 12),
    }
}

/// One decoded real-time telemetry snapshot.
///
/// Every field maps to a fixed offset in the Data Out datagram. Fields that
/// stay constant for a whole race (car identity, track identity, idle RPM)
/// live in [`StaticSessionInfo`](super::StaticSessionInfo) instead and are
/// deliberately absent here, even though their raw bytes arrive with every
/// datagram.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryFrame {
    /// Nonzero while a race is in progress; 0 in menus, replays, and lobbies.
    pub is_race_on: i32,
    /// Milliseconds since the simulator booted. Can overflow and restart.
    pub timestamp_ms: u32,

    pub engine_max_rpm: f32,
    pub current_engine_rpm: f32,

    /// Local-space acceleration in m/s².
    pub acceleration: Vec3,
    /// Local-space velocity in m/s.
    pub velocity: Vec3,
    /// Local-space angular velocity in rad/s.
    pub angular_velocity: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,

    /// Suspension travel normalized to 0.0 (full stretch) .. 1.0 (full compression).
    pub normalized_suspension_travel: WheelSet<f32>,
    /// Tire slip ratio; magnitudes beyond 1.0 mean wheelspin or lockup.
    pub tire_slip_ratio: WheelSet<f32>,
    /// Wheel rotation speed in rad/s.
    pub wheel_rotation_speed: WheelSet<f32>,
    /// 1 when the wheel is on a rumble strip, else 0.
    pub wheel_on_rumble_strip: WheelSet<i32>,
    /// Puddle depth under the wheel, 0.0 .. 1.0.
    pub wheel_in_puddle_depth: WheelSet<f32>,
    /// Non-dimensional surface rumble for force feedback.
    pub surface_rumble: WheelSet<f32>,
    /// Tire slip angle; magnitudes beyond 1.0 mean the tire is sliding.
    pub tire_slip_angle: WheelSet<f32>,
    /// Combined lateral + longitudinal slip.
    pub tire_combined_slip: WheelSet<f32>,
    /// Actual suspension travel in meters.
    pub suspension_travel_meters: WheelSet<f32>,

    /// World-space position in meters.
    pub position: Vec3,
    /// Speed in m/s.
    pub speed: f32,
    /// Power in watts.
    pub power: f32,
    /// Torque in newton-meters.
    pub torque: f32,

    /// Tire temperature in degrees Fahrenheit.
    pub tire_temp: WheelSet<f32>,

    pub boost: f32,
    pub fuel: f32,
    pub distance_traveled: f32,
    /// Best lap time in seconds.
    pub best_lap: f32,
    /// Previous lap time in seconds.
    pub last_lap: f32,
    /// Current lap time in seconds.
    pub current_lap: f32,
    /// Total race time in seconds.
    pub current_race_time: f32,

    pub lap_number: i16,
    /// Race position, 1-based.
    pub race_position: u8,

    /// Throttle input, 0..=255.
    pub accel: u8,
    /// Brake input, 0..=255.
    pub brake: u8,
    pub clutch: u8,
    pub hand_brake: u8,
    /// Selected gear; 0 is reverse, 11 is neutral.
    pub gear: u8,
    /// Steering input, -127 (full left) ..= 127 (full right).
    pub steer: i8,
    pub normalized_driving_line: i8,
    pub normalized_aibrake_difference: i8,

    /// Tire wear, 0.0 (fresh) .. 1.0 (fully worn).
    pub tire_wear: WheelSet<f32>,
}

impl TelemetryFrame {
    /// Decode the real-time fields of one datagram.
    ///
    /// Pure and total: the fixed-size input guarantees every offset is in
    /// range, and any byte pattern decodes to *some* frame. Callers holding an
    /// unsized buffer go through [`as_datagram`](super::as_datagram) first.
    pub fn decode(raw: &RawDatagram) -> Self {
        Self {
            is_race_on: i32_at(raw, layout::IS_RACE_ON),
            timestamp_ms: u32_at(raw, layout::TIMESTAMP_MS),

            engine_max_rpm: f32_at(raw, layout::ENGINE_MAX_RPM),
            current_engine_rpm: f32_at(raw, layout::CURRENT_ENGINE_RPM),

            acceleration: vec3_at(raw, layout::ACCELERATION),
            velocity: vec3_at(raw, layout::VELOCITY),
            angular_velocity: vec3_at(raw, layout::ANGULAR_VELOCITY),
            yaw: f32_at(raw, layout::YAW),
            pitch: f32_at(raw, layout::PITCH),
            roll: f32_at(raw, layout::ROLL),

            normalized_suspension_travel: wheels_f32_at(raw, layout::NORMALIZED_SUSPENSION_TRAVEL),
            tire_slip_ratio: wheels_f32_at(raw, layout::TIRE_SLIP_RATIO),
            wheel_rotation_speed: wheels_f32_at(raw, layout::WHEEL_ROTATION_SPEED),
            wheel_on_rumble_strip: wheels_i32_at(raw, layout::WHEEL_ON_RUMBLE_STRIP),
            wheel_in_puddle_depth: wheels_f32_at(raw, layout::WHEEL_IN_PUDDLE_DEPTH),
            surface_rumble: wheels_f32_at(raw, layout::SURFACE_RUMBLE),
            tire_slip_angle: wheels_f32_at(raw, layout::TIRE_SLIP_ANGLE),
            tire_combined_slip: wheels_f32_at(raw, layout::TIRE_COMBINED_SLIP),
            suspension_travel_meters: wheels_f32_at(raw, layout::SUSPENSION_TRAVEL_METERS),

            position: vec3_at(raw, layout::POSITION),
            speed: f32_at(raw, layout::SPEED),
            power: f32_at(raw, layout::POWER),
            torque: f32_at(raw, layout::TORQUE),

            tire_temp: wheels_f32_at(raw, layout::TIRE_TEMP),

            boost: f32_at(raw, layout::BOOST),
            fuel: f32_at(raw, layout::FUEL),
            distance_traveled: f32_at(raw, layout::DISTANCE_TRAVELED),
            best_lap: f32_at(raw, layout::BEST_LAP),
            last_lap: f32_at(raw, layout::LAST_LAP),
            current_lap: f32_at(raw, layout::CURRENT_LAP),
            current_race_time: f32_at(raw, layout::CURRENT_RACE_TIME),

            lap_number: i16_at(raw, layout::LAP_NUMBER),
            race_position: u8_at(raw, layout::RACE_POSITION),

            accel: u8_at(raw, layout::ACCEL),
            brake: u8_at(raw, layout::BRAKE),
            clutch: u8_at(raw, layout::CLUTCH),
            hand_brake: u8_at(raw, layout::HAND_BRAKE),
            gear: u8_at(raw, layout::GEAR),
            steer: i8_at(raw, layout::STEER),
            normalized_driving_line: i8_at(raw, layout::NORMALIZED_DRIVING_LINE),
            normalized_aibrake_difference: i8_at(raw, layout::NORMALIZED_AIBRAKE_DIFFERENCE),

            tire_wear: wheels_f32_at(raw, layout::TIRE_WEAR),
        }
    }

    /// Whether this frame was produced during an active race.
    pub fn race_is_on(&self) -> bool {
        self.is_race_on != 0
    }
}
