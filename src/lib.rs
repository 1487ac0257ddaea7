// Library entry exposing translator modules.
pub mod classifier;
pub mod cli;
pub mod error;
pub mod reference;
pub mod reverse;
pub mod table;
pub mod translate;
