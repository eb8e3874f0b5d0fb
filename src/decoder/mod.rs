//! LDPC belief propagation decoder.
//!
//! This module implements a flooding-schedule belief propagation decoder on
//! the Tanner graph of a [`ParityCheckCode`](crate::code::ParityCheckCode).
//! The check-node update rule (sum-product or min-sum) is a runtime choice
//! (see [`arithmetic`]), not a structural difference in the decoder.

pub mod arithmetic;

use crate::code::ParityCheckCode;
use arithmetic::{DecoderArithmetic, MinSum, SumProduct};

/// A message traveling along one edge of the Tanner graph, tagged with the
/// node it came from.
#[derive(Debug, Copy, Clone, Default)]
pub struct Message {
    /// Index of the node (variable or check, depending on context) that
    /// produced this message.
    pub source: usize,
    /// The message value (an LLR-like quantity).
    pub value: f64,
}

/// A message about to be sent to a destination node.
#[derive(Debug, Copy, Clone)]
pub struct SentMessage {
    /// Index of the destination node.
    pub dest: usize,
    /// The message value.
    pub value: f64,
}

/// Edge messages grouped by destination node.
#[derive(Debug, Clone)]
struct Messages {
    per_destination: Box<[Box<[Message]>]>,
}

impl Messages {
    fn from_adjacency<'a, I>(adjacency: I) -> Messages
    where
        I: Iterator<Item = &'a [usize]>,
    {
        Messages {
            per_destination: adjacency
                .map(|sources| {
                    sources
                        .iter()
                        .map(|&source| Message { source, value: 0.0 })
                        .collect::<Vec<_>>()
                        .into_boxed_slice()
                })
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        }
    }

    fn send(&mut self, source: usize, destination: usize, value: f64) {
        let message = self.per_destination[destination]
            .iter_mut()
            .find(|m| m.source == source)
            .expect("message for source not found: adjacency lists are inconsistent");
        message.value = value;
    }
}

/// Which check-node update rule a [`Decoder`] uses.
///
/// This is a runtime choice rather than a compile-time one: the same binary
/// can run a sweep with `SumProduct` and another with `MinSum` depending on
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArithmeticKind {
    /// The sum-product (belief propagation) rule.
    SumProduct,
    /// The min-sum approximation, with an optional scaling factor in
    /// `(0, 1]` (1.0 is unscaled min-sum).
    MinSum {
        /// Scaling factor applied to the min-sum magnitude.
        scale: f64,
    },
}

fn build_arithmetic(kind: ArithmeticKind) -> Box<dyn DecoderArithmetic> {
    match kind {
        ArithmeticKind::SumProduct => Box::new(SumProduct::new()),
        ArithmeticKind::MinSum { scale } => Box::new(MinSum::new(scale)),
    }
}

/// Iterative belief propagation decoder for a fixed [`ParityCheckCode`].
///
/// A `Decoder` is mutable per-worker state: it owns its input/output LLR
/// buffers and its edge-message store, and is meant to be reused across many
/// calls to [`Decoder::decode`] for the same code.
pub struct Decoder {
    code: std::sync::Arc<ParityCheckCode>,
    arithmetic: Box<dyn DecoderArithmetic>,
    max_iterations: usize,
    early_term: bool,
    input_llrs: Box<[f64]>,
    output_llrs: Box<[f64]>,
    syndrome: Box<[u8]>,
    var_to_check: Messages,
    check_to_var: Messages,
}

impl Decoder {
    /// Creates a new decoder for `code`.
    pub fn new(
        code: std::sync::Arc<ParityCheckCode>,
        arithmetic: ArithmeticKind,
        max_iterations: usize,
        early_term: bool,
    ) -> Decoder {
        let n = code.n();
        let m = code.m();
        let var_to_check = Messages::from_adjacency((0..m).map(|c| code.check_vars(c)));
        let check_to_var = Messages::from_adjacency((0..n).map(|v| code.var_checks(v)));
        Decoder {
            code,
            arithmetic: build_arithmetic(arithmetic),
            max_iterations,
            early_term,
            input_llrs: vec![0.0; n].into_boxed_slice(),
            output_llrs: vec![0.0; n].into_boxed_slice(),
            syndrome: vec![0; m].into_boxed_slice(),
            var_to_check,
            check_to_var,
        }
    }

    /// The a posteriori LLR for each variable node after the last
    /// [`Decoder::decode`] call.
    pub fn output_llrs(&self) -> &[f64] {
        &self.output_llrs
    }

    /// The syndrome after the last [`Decoder::decode`] call: `syndrome[c]`
    /// is the XOR of the hard decisions of the variables incident to check
    /// `c`. All zero iff the hard decisions form a codeword.
    pub fn syndrome(&self) -> &[u8] {
        &self.syndrome
    }

    /// Runs up to `max_iterations` of belief propagation given channel
    /// `llrs`, and returns the number of iterations actually executed
    /// (always in `1..=max_iterations`).
    ///
    /// After this call, [`Decoder::output_llrs`] and [`Decoder::syndrome`]
    /// are consistent with the last completed iteration.
    pub fn decode(&mut self, llrs: &[f64]) -> usize {
        assert_eq!(llrs.len(), self.input_llrs.len());
        self.input_llrs.copy_from_slice(llrs);
        self.initialize();
        for iteration in 1..=self.max_iterations {
            self.process_check_nodes();
            self.process_variable_nodes();
            self.update_syndrome();
            if self.early_term && self.syndrome.iter().all(|&s| s == 0) {
                return iteration;
            }
        }
        self.max_iterations
    }

    fn initialize(&mut self) {
        for v in 0..self.code.n() {
            for &c in self.code.var_checks(v) {
                self.var_to_check.send(v, c, self.input_llrs[v]);
            }
        }
    }

    fn process_check_nodes(&mut self) {
        for (c, messages) in self.var_to_check.per_destination.iter().enumerate() {
            let check_to_var = &mut self.check_to_var;
            self.arithmetic.send_check_messages(
                messages,
                &mut |msg: SentMessage| check_to_var.send(c, msg.dest, msg.value),
            );
        }
    }

    fn process_variable_nodes(&mut self) {
        for v in 0..self.code.n() {
            let messages = &self.check_to_var.per_destination[v];
            let input_llr = self.input_llrs[v];
            let llr = input_llr + messages.iter().map(|m| m.value).sum::<f64>();
            self.output_llrs[v] = llr;
            let var_to_check = &mut self.var_to_check;
            for m in messages.iter() {
                var_to_check.send(v, m.source, llr - m.value);
            }
        }
    }

    fn update_syndrome(&mut self) {
        for c in 0..self.code.m() {
            let parity = self
                .code
                .check_vars(c)
                .iter()
                .filter(|&&v| self.output_llrs[v] <= 0.0)
                .count()
                % 2;
            self.syndrome[c] = parity as u8;
        }
    }
}
