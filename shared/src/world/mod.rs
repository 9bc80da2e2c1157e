pub mod component;
pub mod delta_frame;
pub mod entity;
pub mod host;
pub mod remote;
pub mod schema;
pub mod world_context;
