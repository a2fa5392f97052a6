pub mod error;
pub mod hit;
pub mod paint;
pub mod thumbnail;

pub use error::RenderError;
pub use hit::{Handle, hit_handle, hit_test, hit_test_rect};
pub use thumbnail::{Thumbnail, render_thumbnail};
