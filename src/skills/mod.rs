mod matcher;
mod taxonomy;

pub use taxonomy::{SkillEntry, SkillTaxonomy};
