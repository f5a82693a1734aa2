//! structviz Core Types and Definitions
//!
//! This crate provides the foundational types shared by the structviz parser,
//! layout engine and command-line tool. It includes:
//!
//! - **Values**: The parsed, format-agnostic input model ([`value::Value`])
//! - **Kinds**: The classification tags a value can receive ([`kind::StructureKind`])
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)

pub mod color;
pub mod geometry;
pub mod identifier;
pub mod kind;
pub mod value;
