pub mod exif;
pub mod photo_writer;
