//! Collision layers (битовые маски).
//!
//! ## Layers:
//! - `LAYER_ADVERSARY` (1): игрок / primary adversary
//! - `LAYER_AGENT` (2): враждебные агенты (все фракции)
//! - `LAYER_OBSTACLE` (4): стены, препятствия (блокируют LOS)
//! - `LAYER_PROJECTILE` (8): снаряды (для ThreatSensor)

// ============================================================================
// Layer битовые маски
// ============================================================================

pub const LAYER_ADVERSARY: u32 = 0b1;
pub const LAYER_AGENT: u32 = 0b10;
pub const LAYER_OBSTACLE: u32 = 0b100;
pub const LAYER_PROJECTILE: u32 = 0b1000;

// ============================================================================
// Masks для запросов
// ============================================================================

/// LOS raycast: только препятствия
pub const MASK_LINE_OF_SIGHT: u32 = LAYER_OBSTACLE;

/// Melee hitbox агента бьёт игрока и агентов других фракций
pub const MASK_AGENT_HITBOX: u32 = LAYER_ADVERSARY | LAYER_AGENT;

pub fn layer_name(layer_bits: u32) -> &'static str {
    match layer_bits {
        LAYER_ADVERSARY => "Adversary",
        LAYER_AGENT => "Agent",
        LAYER_OBSTACLE => "Obstacle",
        LAYER_PROJECTILE => "Projectile",
        _ => "Unknown",
    }
}
