//! Per-tick kinematic integrator.
//!
//! Each aircraft is updated independently in a fixed order: rotate,
//! accelerate, move laterally, move vertically. Later stages read the values
//! written by earlier ones within the same tick.

use geo::{Destination, Geodesic, Point};
use mockingbird_domain::Aircraft;

use crate::control::{
    heading_error, normalize_heading, rate, ALTITUDE_LENGTH_SCALE, HEADING_LENGTH_SCALE,
    SPEED_LENGTH_SCALE,
};

/// Knots to metres per second.
pub const KNOTS_TO_METRES_PER_SECOND: f64 = 1852.0 / 3600.0;

/// Turn towards the target heading.
pub fn rotate(aircraft: &mut Aircraft, dt: f64) {
    aircraft.turn = rate(
        0.0,
        heading_error(aircraft.heading, aircraft.target_heading),
        HEADING_LENGTH_SCALE,
        aircraft.max_turn_rate,
    );
    aircraft.heading = normalize_heading(aircraft.heading + aircraft.turn * dt);
}

/// Change speed towards the target speed.
pub fn accelerate(aircraft: &mut Aircraft, dt: f64) {
    aircraft.acceleration = rate(
        aircraft.speed,
        aircraft.target_speed,
        SPEED_LENGTH_SCALE,
        aircraft.max_acceleration,
    );
    aircraft.speed += aircraft.acceleration * dt;
}

/// Project the position forward along the current heading on the WGS84
/// ellipsoid.
pub fn move_laterally(aircraft: &mut Aircraft, dt: f64) {
    let distance = aircraft.speed * KNOTS_TO_METRES_PER_SECOND * dt;
    let origin = Point::new(aircraft.lon, aircraft.lat);
    let destination = Geodesic::destination(origin, aircraft.heading, distance);
    aircraft.lon = destination.x();
    aircraft.lat = destination.y();
}

/// Climb or descend towards the target flight level.
pub fn move_vertically(aircraft: &mut Aircraft, dt: f64) {
    aircraft.rise = rate(
        aircraft.flight_level,
        aircraft.target_flight_level,
        ALTITUDE_LENGTH_SCALE,
        aircraft.max_rise_rate,
    );
    aircraft.flight_level += aircraft.rise * dt;
}

/// Run one tick for a single aircraft.
pub fn step(aircraft: &mut Aircraft, dt: f64) {
    rotate(aircraft, dt);
    accelerate(aircraft, dt);
    move_laterally(aircraft, dt);
    move_vertically(aircraft, dt);
}

/// Run one tick for every aircraft.
pub fn integrate(fleet: &mut [Aircraft], dt: f64) {
    fleet.iter_mut().for_each(|aircraft| step(aircraft, dt));
}
