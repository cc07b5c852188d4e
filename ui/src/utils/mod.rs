pub mod colors;
pub mod image_data;
pub mod image_saver;
