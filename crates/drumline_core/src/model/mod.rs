//! Notation domain model.
//!
//! # Responsibility
//! - Define modifiers, notes and the rules for overlaying one onto the other.
//!
//! # Invariants
//! - Notes own their attached modifiers by value; location slots refer to
//!   them by `ModifierId` only.
//! - Modifiers carry no back-reference to the note they are attached to.

pub mod applicator;
pub mod dynamic;
pub mod modifier;
pub mod note;
pub mod sticking;
