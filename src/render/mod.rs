//! Rendering subsystem: the junction-aware path renderer (C9) that draws
//! a routed `Path` onto a `Canvas`.

pub mod path_renderer;
