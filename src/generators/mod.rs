//! Output generators (storage folder names, NFO files).

pub mod folder;
pub mod nfo;
