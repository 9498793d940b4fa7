// Library entry exposing translator modules.
pub mod codegen;
pub mod core;
pub mod translator;
