//! Two-layer action-value network with a decoupled target copy
//!
//! ```text
//! input (3) ──W1,b1──► sigmoid hidden (16) ──W2,b2──► linear output (2)
//! ```
//!
//! The online network selects actions and is trained in place. The target
//! network holds an owned snapshot refreshed by [`QNetwork::sync_target`] and
//! is only used to compute bootstrapped next-state values.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, types::Action};

/// Logistic activation of the hidden layer.
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Weights and biases of one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkParameters {
    /// `input_size × hidden_size`
    pub input_to_hidden: Array2<f32>,
    pub hidden_biases: Array1<f32>,
    /// `hidden_size × output_size`
    pub hidden_to_output: Array2<f32>,
    pub output_biases: Array1<f32>,
}

impl NetworkParameters {
    /// Randomly initialized parameters.
    ///
    /// Weights are uniform in `[-x, x]` with `x = sqrt(2 / (fan_in + fan_out))`;
    /// biases are uniform in `[-1, 1]`.
    pub fn xavier<R: Rng>(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        rng: &mut R,
    ) -> Self {
        Self {
            input_to_hidden: xavier_weights(input_size, hidden_size, rng),
            hidden_biases: uniform_biases(hidden_size, rng),
            hidden_to_output: xavier_weights(hidden_size, output_size, rng),
            output_biases: uniform_biases(output_size, rng),
        }
    }

    /// Assemble parameters from explicit arrays.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NetworkShape`] if the arrays do not describe a
    /// consistent input → hidden → output network.
    pub fn from_arrays(
        input_to_hidden: Array2<f32>,
        hidden_biases: Array1<f32>,
        hidden_to_output: Array2<f32>,
        output_biases: Array1<f32>,
    ) -> Result<Self> {
        let (input_size, hidden_size) = input_to_hidden.dim();
        let output_size = hidden_to_output.ncols();

        check_shape("hidden biases", &[hidden_size], hidden_biases.shape())?;
        check_shape(
            "hidden-to-output weights",
            &[hidden_size, output_size],
            hidden_to_output.shape(),
        )?;
        check_shape("output biases", &[output_size], output_biases.shape())?;
        if input_size == 0 || hidden_size == 0 || output_size == 0 {
            return Err(Error::NetworkShape {
                what: "layer sizes",
                expected: vec![1, 1, 1],
                got: vec![input_size, hidden_size, output_size],
            });
        }

        Ok(Self {
            input_to_hidden,
            hidden_biases,
            hidden_to_output,
            output_biases,
        })
    }

    pub fn input_size(&self) -> usize {
        self.input_to_hidden.nrows()
    }

    pub fn hidden_size(&self) -> usize {
        self.input_to_hidden.ncols()
    }

    pub fn output_size(&self) -> usize {
        self.hidden_to_output.ncols()
    }

    /// Evaluate the network on `input`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NetworkShape`] if `input` does not match the input size.
    pub fn forward(&self, input: &[f32]) -> Result<ForwardPass> {
        check_shape("input", &[self.input_size()], &[input.len()])?;
        let input = ArrayView1::from(input);

        let hidden = (input.dot(&self.input_to_hidden) + &self.hidden_biases).mapv(sigmoid);
        let output = hidden.dot(&self.hidden_to_output) + &self.output_biases;

        Ok(ForwardPass { output, hidden })
    }
}

fn xavier_weights<R: Rng>(fan_in: usize, fan_out: usize, rng: &mut R) -> Array2<f32> {
    let limit = (2.0 / (fan_in + fan_out) as f32).sqrt();
    Array2::from_shape_fn((fan_in, fan_out), |_| rng.random_range(-limit..=limit))
}

fn uniform_biases<R: Rng>(size: usize, rng: &mut R) -> Array1<f32> {
    Array1::from_shape_fn(size, |_| rng.random_range(-1.0..=1.0))
}

fn check_shape(what: &'static str, expected: &[usize], got: &[usize]) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(Error::NetworkShape {
            what,
            expected: expected.to_vec(),
            got: got.to_vec(),
        })
    }
}

/// Activations produced by one forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPass {
    /// One value per action
    pub output: Array1<f32>,
    /// Sigmoid activations, kept for backpropagation
    pub hidden: Array1<f32>,
}

/// Frozen copy of the online parameters used for bootstrapped targets.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetNetwork {
    parameters: NetworkParameters,
}

impl TargetNetwork {
    pub fn parameters(&self) -> &NetworkParameters {
        &self.parameters
    }

    pub fn forward(&self, input: &[f32]) -> Result<ForwardPass> {
        self.parameters.forward(input)
    }
}

/// Online action-value network plus its target network.
#[derive(Debug, Clone)]
pub struct QNetwork {
    online: NetworkParameters,
    target: TargetNetwork,
}

impl QNetwork {
    /// Create a randomly initialized network whose target starts in sync.
    pub fn new<R: Rng>(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        rng: &mut R,
    ) -> Self {
        Self::from_parameters(NetworkParameters::xavier(
            input_size,
            hidden_size,
            output_size,
            rng,
        ))
    }

    pub fn from_parameters(parameters: NetworkParameters) -> Self {
        let target = TargetNetwork {
            parameters: parameters.clone(),
        };
        Self {
            online: parameters,
            target,
        }
    }

    pub fn parameters(&self) -> &NetworkParameters {
        &self.online
    }

    pub fn target(&self) -> &TargetNetwork {
        &self.target
    }

    /// Forward pass through the online network.
    pub fn forward(&self, input: &[f32]) -> Result<ForwardPass> {
        self.online.forward(input)
    }

    /// Action with the highest online value; ties go to the lower index.
    pub fn best_action(&self, x_position: f32, rel_position: f32, time: f32) -> Result<Action> {
        let pass = self.forward(&[x_position, rel_position, time])?;
        let mut best = 0;
        for (index, &value) in pass.output.iter().enumerate().skip(1) {
            if value > pass.output[best] {
                best = index;
            }
        }
        Action::from_index(best)
    }

    /// Largest value the target network assigns to the given features.
    pub fn max_q_value(&self, x_position: f32, rel_position: f32, time: f32) -> Result<f32> {
        let pass = self.target.forward(&[x_position, rel_position, time])?;
        Ok(pass.output.iter().copied().fold(f32::NEG_INFINITY, f32::max))
    }

    /// Copy every online parameter into the target network.
    pub fn sync_target(&mut self) {
        self.target.parameters.clone_from(&self.online);
    }

    /// One in-place stochastic gradient step towards `target`.
    ///
    /// The same scalar target is applied to every output, and the output
    /// delta uses the sigmoid derivative `out * (1 - out)` even though the
    /// output layer is linear. The squared error itself (not the signed
    /// error) scales the delta, so the step direction does not depend on
    /// whether the target is above or below the prediction.
    pub fn sgd_update(
        &mut self,
        x_position: f32,
        rel_position: f32,
        time_ms: f32,
        target: f32,
        learning_rate: f32,
    ) -> Result<()> {
        let input = [x_position, rel_position, time_ms];
        let ForwardPass { output, hidden } = self.forward(&input)?;

        let loss = output.mapv(|out| (target - out) * (target - out));
        let delta_output = &loss * &output * &output.mapv(|out| 1.0 - out);

        // Backpropagate through the weights used in the forward pass
        let delta_hidden =
            &hidden * &hidden.mapv(|h| 1.0 - h) * self.online.hidden_to_output.dot(&delta_output);

        let input = ArrayView1::from(&input[..]);
        let hidden_column = hidden.view().insert_axis(Axis(1));
        let input_column = input.insert_axis(Axis(1));

        self.online.hidden_to_output.scaled_add(
            learning_rate,
            &hidden_column.dot(&delta_output.view().insert_axis(Axis(0))),
        );
        self.online.input_to_hidden.scaled_add(
            learning_rate,
            &input_column.dot(&delta_hidden.view().insert_axis(Axis(0))),
        );
        self.online
            .output_biases
            .scaled_add(learning_rate, &delta_output);
        self.online
            .hidden_biases
            .scaled_add(learning_rate, &delta_hidden);

        Ok(())
    }
}
