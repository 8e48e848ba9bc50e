mod encoder;
mod store;

pub use encoder::encode;
pub use store::{Upload, UploadStore};
