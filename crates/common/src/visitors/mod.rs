mod lister;
mod normalizer;

pub use lister::{ListVisitor, Lister};
pub use normalizer::{
    DomainMigration, NormalizeMode, NormalizeVisitor, Normalizer, NormalizerConfig,
};
