pub mod assembler;
pub mod country;
pub mod grouping;
pub mod merge;
pub mod passes;
pub mod rules;

pub use assembler::SubscriptionAssembler;
