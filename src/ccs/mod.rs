//! CCS process terms and the net encoder producing them.

pub mod ast;
pub mod encode;
pub mod printer;

pub use ast::{Action, ActionName, CcsError, Composition, ConstantName, Prefix, Process, Summation};
pub use encode::{CcsEncoding, encode};
pub use printer::{RenderStyle, render, render_plain, render_rich};
