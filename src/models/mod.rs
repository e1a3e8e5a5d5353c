pub mod data;
pub mod profiles;

pub use data::*;
pub use profiles::{select_profile, CharacterProfiles, DocumentClass, DocumentProfile};
