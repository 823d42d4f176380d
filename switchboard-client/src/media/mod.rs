mod source;
mod stream;

pub use source::*;
pub use stream::*;
