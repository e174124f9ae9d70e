//! Kinematic движение (velocity integration, расталкивание агентов).
//!
//! Коллизии со стенами и настоящая физика: у host, см. `spatial`.

pub mod movement;

pub use movement::{
    integrate_motion, resolve_agent_overlap, separation_force, Motor, MIN_AGENT_SPACING,
    SEPARATION_RADIUS, SEPARATION_STRENGTH,
};
