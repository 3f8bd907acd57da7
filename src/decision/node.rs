use std::fmt;

use crate::decision::Outcome;
use crate::decision::flow;
use crate::decision::fsm::Fsm;

/// A decision node, named after its cell in the HTTP decision diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    B13,
    B12,
    B11,
    B10,
    B9,
    B9b,
    B8,
    B7,
    B6,
    B5,
    B4,
    B3,
    C3,
    C4,
    D4,
    D5,
    E5,
    E6,
    F6,
    F7,
    G7,
    G8,
    G9,
    G11,
    H7,
    H10,
    H11,
    H12,
    I4,
    I7,
    I12,
    I13,
    J18,
    K5,
    K7,
    K13,
    L5,
    L7,
    L13,
    L14,
    L15,
    L17,
    M5,
    M7,
    M16,
    M20,
    M20b,
    N5,
    N11,
    N16,
    O14,
    O16,
    O18,
    O20,
    P3,
    P11,
}

impl Node {
    /// Where every traversal begins.
    pub const START: Node = Node::B13;

    pub(crate) fn decide(self) -> DecisionFn {
        FLOW[self as usize].1
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a node decided: move on, or answer with a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Next(Node),
    Respond(u16),
}

pub(crate) type DecisionFn = fn(&mut Fsm<'_>) -> Outcome<Decision>;

/// The decision graph. Entries are in `Node` declaration order so a node's
/// discriminant indexes its own row.
pub(crate) static FLOW: [(Node, DecisionFn); 56] = [
    (Node::B13, flow::b13),
    (Node::B12, flow::b12),
    (Node::B11, flow::b11),
    (Node::B10, flow::b10),
    (Node::B9, flow::b9),
    (Node::B9b, flow::b9b),
    (Node::B8, flow::b8),
    (Node::B7, flow::b7),
    (Node::B6, flow::b6),
    (Node::B5, flow::b5),
    (Node::B4, flow::b4),
    (Node::B3, flow::b3),
    (Node::C3, flow::c3),
    (Node::C4, flow::c4),
    (Node::D4, flow::d4),
    (Node::D5, flow::d5),
    (Node::E5, flow::e5),
    (Node::E6, flow::e6),
    (Node::F6, flow::f6),
    (Node::F7, flow::f7),
    (Node::G7, flow::g7),
    (Node::G8, flow::g8),
    (Node::G9, flow::g9),
    (Node::G11, flow::g11),
    (Node::H7, flow::h7),
    (Node::H10, flow::h10),
    (Node::H11, flow::h11),
    (Node::H12, flow::h12),
    (Node::I4, flow::i4),
    (Node::I7, flow::i7),
    (Node::I12, flow::i12),
    (Node::I13, flow::i13),
    (Node::J18, flow::j18),
    (Node::K5, flow::k5),
    (Node::K7, flow::k7),
    (Node::K13, flow::k13),
    (Node::L5, flow::l5),
    (Node::L7, flow::l7),
    (Node::L13, flow::l13),
    (Node::L14, flow::l14),
    (Node::L15, flow::l15),
    (Node::L17, flow::l17),
    (Node::M5, flow::m5),
    (Node::M7, flow::m7),
    (Node::M16, flow::m16),
    (Node::M20, flow::m20),
    (Node::M20b, flow::m20b),
    (Node::N5, flow::n5),
    (Node::N11, flow::n11),
    (Node::N16, flow::n16),
    (Node::O14, flow::o14),
    (Node::O16, flow::o16),
    (Node::O18, flow::o18),
    (Node::O20, flow::o20),
    (Node::P3, flow::p3),
    (Node::P11, flow::p11),
];
