pub mod common;
pub mod image;
pub mod poem;
pub mod text;

pub use common::*;
pub use image::*;
pub use poem::*;
pub use text::*;
