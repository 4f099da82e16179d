pub mod dinic;
pub mod flow_graph;
