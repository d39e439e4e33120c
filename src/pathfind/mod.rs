//! Pathfinding subsystem: the A* core (C5) and the smart pathfinder
//! façade (C6) that wraps it with a fast path, optimisation passes, and
//! a result cache.

pub mod astar;
pub mod cache;
pub mod smart;
