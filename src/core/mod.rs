pub mod allocator;
pub mod renderer;
pub mod rng;
pub mod rules;
pub mod session;
pub mod template;
