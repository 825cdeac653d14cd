mod component;
mod controller;
mod gate;
mod model;
mod pricing;
mod render;
mod state;
mod types;

pub use component::EstimateGraph;
