//! Textual renderings of CCS terms.
//!
//! [`RenderStyle::Plain`] is the compact one-line form used by `Display`:
//! `(νs_t1)(X_p1 ∥ X_p2)`. [`RenderStyle::Rich`] emits an HTML fragment with
//! subscripted indices, overlined co-actions and superscript exponents.
use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

use crate::ccs::ast::{Action, Prefix, Process};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    #[default]
    Plain,
    Rich,
}

trait Notation {
    fn name(&self, name: &str, out: &mut String);
    fn action(&self, action: &Action, out: &mut String);
    fn exponent(&self, count: u64, out: &mut String);
    fn restriction(&self, name: &str, out: &mut String);
    fn parallel(&self) -> &'static str;
}

struct Plain;

impl Notation for Plain {
    fn name(&self, name: &str, out: &mut String) {
        out.push_str(name);
    }

    fn action(&self, action: &Action, out: &mut String) {
        match action {
            Action::Input(name) => {
                out.push_str(name.as_str());
                out.push('?');
            }
            Action::Co(name) => {
                out.push_str(name.as_str());
                out.push('!');
            }
            Action::Internal => out.push('τ'),
        }
    }

    fn exponent(&self, count: u64, out: &mut String) {
        let _ = write!(out, "^{count}");
    }

    fn restriction(&self, name: &str, out: &mut String) {
        let _ = write!(out, "(ν{name})");
    }

    fn parallel(&self) -> &'static str {
        " ∥ "
    }
}

struct Rich;

impl Notation for Rich {
    /// `X_p1` becomes `X<sub>p1</sub>`.
    fn name(&self, name: &str, out: &mut String) {
        match name.split_once('_') {
            Some((base, index)) if !index.is_empty() => {
                let _ = write!(out, "{base}<sub>{index}</sub>");
            }
            _ => out.push_str(name),
        }
    }

    fn action(&self, action: &Action, out: &mut String) {
        match action {
            Action::Input(name) => self.name(name.as_str(), out),
            Action::Co(name) => {
                out.push_str("<span style=\"text-decoration: overline\">");
                self.name(name.as_str(), out);
                out.push_str("</span>");
            }
            Action::Internal => out.push_str("&tau;"),
        }
    }

    fn exponent(&self, count: u64, out: &mut String) {
        let _ = write!(out, "<sup>{count}</sup>");
    }

    fn restriction(&self, name: &str, out: &mut String) {
        out.push_str("(&nu;");
        self.name(name, out);
        out.push(')');
    }

    fn parallel(&self) -> &'static str {
        " &#8741; "
    }
}

pub fn render(process: &Process, style: RenderStyle) -> String {
    let mut out = String::new();
    match style {
        RenderStyle::Plain => write_process(&Plain, process, &mut out),
        RenderStyle::Rich => write_process(&Rich, process, &mut out),
    }
    out
}

pub fn render_plain(process: &Process) -> String {
    render(process, RenderStyle::Plain)
}

pub fn render_rich(process: &Process) -> String {
    render(process, RenderStyle::Rich)
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_plain(self))
    }
}

fn write_process<N: Notation>(notation: &N, process: &Process, out: &mut String) {
    match process {
        Process::Inaction => out.push('0'),
        Process::Constant(name) => notation.name(name.as_str(), out),
        Process::Prefix(prefix) => write_prefix(notation, prefix, out),
        Process::Choice(choice) => {
            for (idx, summand) in choice.summands().iter().enumerate() {
                if idx > 0 {
                    out.push_str(" + ");
                }
                write_prefix(notation, summand, out);
            }
        }
        Process::Parallel(parallel) => {
            for (idx, component) in parallel.components().iter().enumerate() {
                if idx > 0 {
                    out.push_str(notation.parallel());
                }
                let grouped = matches!(component, Process::Choice(_) | Process::Restriction(..));
                write_operand(notation, component, grouped, out);
            }
        }
        Process::Exponent(inner, count) => {
            let atomic = matches!(**inner, Process::Inaction | Process::Constant(_));
            write_operand(notation, inner, !atomic, out);
            notation.exponent(*count, out);
        }
        Process::Restriction(name, inner) => {
            notation.restriction(name.as_str(), out);
            write_operand(notation, inner, is_compound(inner), out);
        }
    }
}

fn write_prefix<N: Notation>(notation: &N, prefix: &Prefix, out: &mut String) {
    notation.action(&prefix.action, out);
    out.push('.');
    let continuation = &*prefix.continuation;
    write_operand(notation, continuation, is_compound(continuation), out);
}

fn write_operand<N: Notation>(notation: &N, process: &Process, grouped: bool, out: &mut String) {
    if grouped {
        out.push('(');
        write_process(notation, process, out);
        out.push(')');
    } else {
        write_process(notation, process, out);
    }
}

fn is_compound(process: &Process) -> bool {
    matches!(process, Process::Choice(_) | Process::Parallel(_))
}
