pub mod caps;
pub mod context;
pub mod effect;
pub mod image;
pub mod key;
pub mod producer;
pub mod texture;

#[cfg(test)]
pub(crate) mod testing;

pub use caps::Caps;
pub use context::RecordingContext;
pub use effect::{DomainMode, Filter, ShaderStage};
pub use image::{ImageGenerator, ImageId, ImageInfo, LazyImage, LogicalImage, YuvaImage};
pub use key::{CopyParams, Domain, KeyDomains, UniqueKey};
pub use producer::{
    AllowedTexGenType, CachingHint, FilterConstraint, TextureMaker, TextureProducer,
};
pub use texture::{TextureKey, TextureView};
