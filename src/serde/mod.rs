//! Bridges between [`Value`](crate::Value) trees and serde data models.

pub mod de;
pub mod ser;
