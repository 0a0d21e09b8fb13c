pub mod sumo;
