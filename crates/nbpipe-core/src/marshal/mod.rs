//! Marshal directory: variables handed from one pipeline step to the next.
//!
//! Step code writes one file per exported variable into a hidden directory
//! next to the notebook. Later steps (or an interactive exploration session)
//! read them back by file stem.

mod resource;
mod store;

pub use resource::{ExtensionLoader, MarshalValue, ResourceLoader};
pub use store::{MARSHAL_DIR_POSTFIX, MarshalStore, marshal_dir};
