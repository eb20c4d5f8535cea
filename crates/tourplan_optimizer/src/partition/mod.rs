pub mod capacity_partitioner;
pub mod payload_drop;
