pub mod collab;
pub mod descriptor;
pub mod directive;
pub mod emit;
pub mod error;
pub mod generator;
mod input;
pub mod naming;
pub mod snippet;
pub mod stamp;
pub mod types;

pub use collab::{Clock, GitDescribe, RevisionSource, SystemClock};
pub use error::{ErrorKind, GenError, GenResult};
pub use generator::{Generator, GeneratorOptions, Rendered, DEFAULT_FILENAME};
pub use naming::{NameFormatter, NamingStyle, PascalFunctions, SnakeFunctions};
pub use stamp::{Artifact, DIGEST_LABEL};
