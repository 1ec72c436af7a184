//! Read-only game data: the static data oracle and the translation table

pub mod oracle;
pub mod translate;

pub use oracle::{Accuracy, Dex, MoveData, SpeciesData, StaticDex};
pub use translate::{Category, Translations};
