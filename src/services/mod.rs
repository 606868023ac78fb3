//! External collaborators: TMDB, Kodi, WebDAV and ffmpeg.

pub mod ffprobe;
pub mod kodi;
pub mod provider;
pub mod tmdb;
pub mod webdav;
