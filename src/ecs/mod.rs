pub mod components;

/// Actors are hecs entities; the id doubles as the registry key.
pub type ActorId = hecs::Entity;
