//! Umbrella layout discovery: mode selection, manifest lookup and the app
//! dictionary.

pub mod dictionary;
pub mod locator;
pub mod mode;

pub use dictionary::{build_app_dictionary, extract_app_name, AppDictionary, AppResolution};
pub use locator::ManifestLocator;
pub use mode::{select_mode, Mode};
