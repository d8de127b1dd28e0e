pub mod cover;
pub mod credential;
pub mod video;

pub use cover::CoverRef;
pub use credential::{Credential, CredentialSource};
pub use video::VideoRecord;
