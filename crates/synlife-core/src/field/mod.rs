//! Hidden scalar field sensed by creatures

mod phi_field;

pub use phi_field::{BackActionPatch, PhiField, GRADIENT_EPSILON};
