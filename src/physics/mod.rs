pub mod body;
pub mod body_properties;
pub mod callback_bridge;
pub mod engine;
pub mod force_accumulator;
pub mod pose_buffer;
pub mod spin_lock;

#[cfg(test)]
pub(crate) mod test_world;
