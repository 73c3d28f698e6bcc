pub mod layout;
pub mod renderer;
