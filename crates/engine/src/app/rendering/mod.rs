mod panel;
mod renderer;

pub use renderer::Renderer;
