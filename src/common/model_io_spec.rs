/// Input/output shapes of a loaded detection model.
///
/// Input is `[batch, channels, height, width]`, output is
/// `[batch, 4 + num_classes, num_candidates]`. A dimension the model leaves
/// dynamic is recorded as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModelIoSpec {
    pub input_shape: [usize; 4],
    pub output_shape: [usize; 3],
}

impl ModelIoSpec {
    pub fn new(input_shape: [usize; 4], output_shape: [usize; 3]) -> Self {
        Self {
            input_shape,
            output_shape,
        }
    }

    pub fn input_width(&self) -> u32 {
        self.input_shape[3] as u32
    }

    pub fn input_height(&self) -> u32 {
        self.input_shape[2] as u32
    }

    pub fn input_channels(&self) -> usize {
        self.input_shape[1]
    }

    pub fn output_channels(&self) -> usize {
        self.output_shape[1]
    }

    pub fn num_candidates(&self) -> usize {
        self.output_shape[2]
    }

    /// Class count implied by the output channels, if the channel dim is static.
    pub fn num_classes(&self) -> Option<usize> {
        self.output_channels().checked_sub(4).filter(|nc| *nc > 0)
    }
}
