//! Net → CCS encoding for 2-τ-synchronisation nets.
//!
//! Every place `p` becomes a constant `X_p` defined as the choice over the
//! transitions it feeds. A transition with one input contributes its prefix
//! directly; a transition with two inputs becomes a synchronisation on a fresh
//! restricted name `s_t`, where the first feeding place emits `s_t!.0` and the
//! second waits on `s_t?` before producing the output places. Transitions
//! without inputs become self-regenerating constants `X_t`.
use std::fmt;

use indexmap::IndexMap;
use log::{debug, info};

use crate::ccs::ast::{Action, ActionName, ConstantName, Prefix, Process};
use crate::ccs::printer::{RenderStyle, render};
use crate::classify::is_2tau_synchronisation_net;
use crate::net::{Label, Net, NetError, Place, Transition, TransitionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcsEncoding {
    /// Place constants in place order, then generator constants in transition
    /// order.
    pub definitions: IndexMap<ConstantName, Process>,
    pub initial: Process,
    /// Restricted synchronisation names, sorted.
    pub sync_names: Vec<ActionName>,
}

impl CcsEncoding {
    pub fn render(&self, style: RenderStyle) -> String {
        let mut out = String::new();
        for (name, body) in &self.definitions {
            let head = render(&Process::Constant(name.clone()), style);
            out.push_str(&head);
            out.push_str(" := ");
            out.push_str(&render(body, style));
            out.push('\n');
        }
        out.push_str(&render(&self.initial, style));
        out
    }
}

impl fmt::Display for CcsEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(RenderStyle::Plain))
    }
}

pub fn place_constant(place: &Place) -> Result<ConstantName, NetError> {
    Ok(ConstantName::new(format!("X_p{}", place.name))?)
}

pub fn generator_constant(transition: &Transition) -> Result<ConstantName, NetError> {
    Ok(ConstantName::new(format!("X_t{}", transition.name))?)
}

pub fn sync_name(transition: &Transition) -> Result<ActionName, NetError> {
    Ok(ActionName::new(format!("s_t{}", transition.name))?)
}

/// Per-transition contribution to the definitions of its input places.
enum Branch {
    /// No inputs, defined as its own constant.
    Generator,
    Single(Prefix),
    /// Two inputs; the prefix receives on `name`.
    Sync { name: ActionName, receive: Prefix },
}

pub fn encode(net: &Net) -> Result<CcsEncoding, NetError> {
    if !is_2tau_synchronisation_net(net) {
        return Err(NetError::StructuralMismatch {
            operation: "CCS encoding",
            required: "2-τ-synchronisation",
        });
    }

    let mut definitions = IndexMap::new();
    let mut generators = Vec::new();
    let mut generator_definitions = Vec::new();
    let mut branches = Vec::with_capacity(net.transitions_len());
    let mut sync_names = Vec::new();

    for transition in net.transitions().iter() {
        let produced = output_composition(net, transition.id)?;
        let branch = match transition.incoming.len() {
            0 => {
                let name = generator_constant(transition)?;
                let mut components = flatten(produced);
                components.push(Process::Constant(name.clone()));
                let body = Process::prefix(
                    label_action(&transition.label)?,
                    Process::compose(components),
                );
                generators.push(Process::Constant(name.clone()));
                generator_definitions.push((name, body));
                Branch::Generator
            }
            1 => Branch::Single(Prefix::new(label_action(&transition.label)?, produced)),
            2 => {
                let name = sync_name(transition)?;
                sync_names.push(name.clone());
                Branch::Sync {
                    receive: Prefix::new(Action::Input(name.clone()), produced),
                    name,
                }
            }
            _ => {
                return Err(NetError::StructuralMismatch {
                    operation: "CCS encoding",
                    required: "2-τ-synchronisation",
                });
            }
        };
        branches.push(branch);
    }

    let mut sending = vec![false; net.transitions_len()];
    for place in net.places().iter() {
        let mut summands = Vec::with_capacity(place.outgoing.len());
        for consumer in net.consumers(place.id) {
            match &branches[consumer.index()] {
                Branch::Single(prefix) => summands.push(prefix.clone()),
                Branch::Sync { name, receive } => {
                    if sending[consumer.index()] {
                        summands.push(receive.clone());
                    } else {
                        sending[consumer.index()] = true;
                        summands.push(Prefix::new(Action::Co(name.clone()), Process::Inaction));
                    }
                }
                // a consumer always has at least one input
                Branch::Generator => {}
            }
        }
        let name = place_constant(place)?;
        debug!("{name} chooses between {} transitions", summands.len());
        definitions.insert(name, Process::sum(summands));
    }
    definitions.extend(generator_definitions);

    let mut initial = net
        .places()
        .iter()
        .filter(|place| place.tokens > 0)
        .map(|place| {
            let constant = Process::Constant(place_constant(place)?);
            Ok(if place.tokens > 1 {
                Process::exponent(constant, place.tokens)
            } else {
                constant
            })
        })
        .collect::<Result<Vec<_>, NetError>>()?;
    initial.extend(generators);
    let mut initial = Process::compose(initial);

    sync_names.sort();
    for name in sync_names.iter().rev() {
        initial = Process::restrict(name.clone(), initial);
    }

    info!(
        "encoded net into {} definitions with {} synchronisations",
        definitions.len(),
        sync_names.len()
    );
    Ok(CcsEncoding {
        definitions,
        initial,
        sync_names,
    })
}

fn label_action(label: &Label) -> Result<Action, NetError> {
    Ok(match label {
        Label::Tau => Action::Internal,
        Label::Visible(name) => Action::Input(ActionName::new(name.as_str())?),
    })
}

/// Parallel composition of the places produced by `transition`.
fn output_composition(net: &Net, transition: TransitionId) -> Result<Process, NetError> {
    let components = net
        .postset(transition)
        .map(|(place, weight)| {
            let constant = Process::Constant(place_constant(&net.places()[place])?);
            Ok(if weight > 1 {
                Process::exponent(constant, weight)
            } else {
                constant
            })
        })
        .collect::<Result<Vec<_>, NetError>>()?;
    Ok(Process::compose(components))
}

fn flatten(process: Process) -> Vec<Process> {
    match process {
        Process::Inaction => Vec::new(),
        Process::Parallel(parallel) => parallel.components().to_vec(),
        other => vec![other],
    }
}
