mod error;
mod process;
mod record;
mod stream;

pub use error::PoseError;
pub use process::PoseCommand;
pub use stream::PoseStream;
