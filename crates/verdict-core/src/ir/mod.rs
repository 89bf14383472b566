//! Compiled rule representation
//!
//! The compiler turns parsed definitions into immutable [`Rule`] values and
//! groups them into a versioned [`RuleSet`]. Neither is mutated after
//! construction; a new version is always a new object.

pub mod rule;
pub mod ruleset;
pub mod tier;

pub use rule::Rule;
pub use ruleset::RuleSet;
pub use tier::Tier;
