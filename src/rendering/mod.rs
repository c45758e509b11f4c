pub mod animation;
pub mod codec;

pub use animation::encode_progression;
pub use codec::{crop, decode_upload, encode_png, read_png};
