//! Check-node update rules for belief propagation.
//!
//! [`DecoderArithmetic`] factors the one part of the decoder's update rule
//! that has more than one reasonable implementation: how a check node
//! combines its incoming variable messages. Everything else (the message
//! store, the variable-node update, the syndrome) is shared by every rule.
//!
//! The trait takes a trait-object closure (`&mut dyn FnMut`) rather than a
//! generic one so that a [`crate::decoder::Decoder`] can select its rule at
//! construction time from a runtime [`super::ArithmeticKind`] value, instead
//! of needing one monomorphized decoder type per rule.

use super::{Message, SentMessage};

/// A check-node update rule.
pub trait DecoderArithmetic: std::fmt::Debug + Send {
    /// Computes the outgoing check-to-variable messages for one check node,
    /// given the incoming variable-to-check messages at that node, and
    /// calls `send` once per outgoing message.
    fn send_check_messages(&self, var_messages: &[Message], send: &mut dyn FnMut(SentMessage));
}

/// Sum-product (belief propagation) check-node update.
///
/// Computes `2 * atanh(prod_{v' != v} tanh(msg(v') / 2))` using the
/// sign/magnitude decomposition with the involution `phi(x) = -log(tanh(x /
/// 2))`, which avoids the numerical instability of multiplying many `tanh`
/// values close to +-1 directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumProduct {
    _private: (),
}

impl SumProduct {
    /// Creates a new sum-product update rule.
    pub fn new() -> SumProduct {
        SumProduct::default()
    }

    fn phi(x: f64) -> f64 {
        // phi(0) would be +inf, which gives NaN when later combined as
        // (+inf) - (+inf); keep x away from zero by a small epsilon.
        let x = x.max(1e-30);
        -((0.5 * x).tanh().ln())
    }
}

impl DecoderArithmetic for SumProduct {
    fn send_check_messages(&self, var_messages: &[Message], send: &mut dyn FnMut(SentMessage)) {
        let mut sign: u32 = 0;
        let mut sum = 0.0;
        let mut phis = Vec::with_capacity(var_messages.len());
        for msg in var_messages {
            let phi_x = Self::phi(msg.value.abs());
            sum += phi_x;
            phis.push(phi_x);
            if msg.value < 0.0 {
                sign ^= 1;
            }
        }
        for (msg, &phi_x) in var_messages.iter().zip(phis.iter()) {
            let y = Self::phi(sum - phi_x);
            let s = if msg.value < 0.0 { sign ^ 1 } else { sign };
            let value = if s == 0 { y } else { -y };
            send(SentMessage {
                dest: msg.source,
                value,
            });
        }
    }
}

/// Min-sum approximation to the sum-product check-node update.
///
/// Computes `sign(prod sign(msg)) * scale * min_{v' != v} |msg(v')|`. With
/// `scale = 1.0` this is the plain min-sum rule; smaller values of `scale`
/// (a common choice is around `0.75`) correct for min-sum's well-known
/// overestimation of the true sum-product message magnitude.
#[derive(Debug, Clone, Copy)]
pub struct MinSum {
    scale: f64,
}

impl MinSum {
    /// Creates a new min-sum update rule with the given magnitude scaling
    /// factor, which should lie in `(0, 1]`.
    pub fn new(scale: f64) -> MinSum {
        MinSum { scale }
    }
}

impl DecoderArithmetic for MinSum {
    fn send_check_messages(&self, var_messages: &[Message], send: &mut dyn FnMut(SentMessage)) {
        let mut sign: u32 = 0;
        let mut min1 = f64::INFINITY;
        let mut min2 = f64::INFINITY;
        let mut min1_source = None;
        for msg in var_messages {
            let mag = msg.value.abs();
            if msg.value < 0.0 {
                sign ^= 1;
            }
            if mag < min1 {
                min2 = min1;
                min1 = mag;
                min1_source = Some(msg.source);
            } else if mag < min2 {
                min2 = mag;
            }
        }
        for msg in var_messages {
            let mag = if Some(msg.source) == min1_source {
                min2
            } else {
                min1
            };
            let s = if msg.value < 0.0 { sign ^ 1 } else { sign };
            let value = if s == 0 {
                self.scale * mag
            } else {
                -self.scale * mag
            };
            send(SentMessage {
                dest: msg.source,
                value,
            });
        }
    }
}
