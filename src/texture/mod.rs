mod cache;
mod keys;
mod manager;
mod resource;
mod view;

pub use cache::ResourceCache;
pub use keys::*;
pub use manager::TextureManager;
pub use resource::{Texture, TextureDesc};
pub use view::{Channel, SurfaceOrigin, Swizzle, TextureView};
