pub mod estimate_graph;
