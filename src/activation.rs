//! Activation functions.
//!
//! Hidden layers always use `tanh`. The output layer uses `tanh` in classification mode and
//! the identity in regression mode.
//!
//! Activations are cached *post-activation* in the model, so derivatives are expressed in
//! terms of the output `y` rather than the pre-activation `z`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Tanh,
    Identity,
}

impl Activation {
    /// Activation used by layer `l` of a network whose output layer is `last`.
    #[inline]
    pub fn for_layer(l: usize, last: usize, is_classification: bool) -> Self {
        if is_classification || l != last {
            Activation::Tanh
        } else {
            Activation::Identity
        }
    }

    #[inline]
    pub fn forward(self, x: f64) -> f64 {
        match self {
            Activation::Tanh => x.tanh(),
            Activation::Identity => x,
        }
    }

    /// Apply the activation element-wise in place.
    #[inline]
    pub fn forward_in_place(self, xs: &mut [f64]) {
        if self == Activation::Identity {
            return;
        }
        for x in xs {
            *x = self.forward(*x);
        }
    }

    /// Derivative with respect to the pre-activation, given the cached output `y`.
    #[inline]
    pub fn grad_from_output(self, y: f64) -> f64 {
        match self {
            // tanh'(z) = 1 - tanh(z)^2
            Activation::Tanh => 1.0 - y * y,
            Activation::Identity => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_layer_rule() {
        assert_eq!(Activation::for_layer(1, 2, false), Activation::Tanh);
        assert_eq!(Activation::for_layer(2, 2, false), Activation::Identity);
        assert_eq!(Activation::for_layer(2, 2, true), Activation::Tanh);
    }

    #[test]
    fn tanh_gradient_from_output() {
        let y = Activation::Tanh.forward(0.3);
        let g = Activation::Tanh.grad_from_output(y);
        assert!((g - (1.0 - y * y)).abs() < 1e-12);
        assert_eq!(Activation::Identity.grad_from_output(5.0), 1.0);
    }

    #[test]
    fn in_place_matches_scalar() {
        let mut xs = [0.0, 0.5, -2.0];
        Activation::Tanh.forward_in_place(&mut xs);
        assert_eq!(xs[0], 0.0);
        assert_eq!(xs[1], 0.5_f64.tanh());
        assert_eq!(xs[2], (-2.0_f64).tanh());

        let mut ys = [1.5, -3.0];
        Activation::Identity.forward_in_place(&mut ys);
        assert_eq!(ys, [1.5, -3.0]);
    }
}
