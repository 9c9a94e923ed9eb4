//! Snapbox ingest core.
//!
//! Pure domain logic for the media capture service: payload decoding, photo
//! normalization, video transcoding, the directory-backed media store, and
//! gallery pagination. No HTTP concerns live here.

pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod gallery;
pub mod imaging;
pub mod ingest;
pub mod naming;
pub mod payload;
pub mod store;
