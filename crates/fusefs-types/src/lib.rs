//! Shared value types for fusefs.
//!
//! A pure leaf crate: the dynamic positional model that capability
//! providers, interceptors and host bridges exchange.
//!
//! | Type        | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | [`Value`]   | One positional argument or result element        |
//! | [`Buffer`]  | Shared byte buffer filled in place by providers  |
//! | [`Args`]    | Positional argument tuple                        |
//! | [`Results`] | Result tuple, error indicator first              |

pub mod value;

pub use value::{Args, Buffer, Results, Value};
